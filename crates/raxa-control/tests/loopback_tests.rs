use raxa_control::{
    BridgeConfig, BridgeEvent, BridgeRegistry, CommandSender, TellstickNet, EVENT_QUEUE_CAPACITY,
};
use raxa_core::{frame, DeviceCommand};
use std::net::{IpAddr, Ipv4Addr, UdpSocket};
use std::sync::Arc;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(2);
const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

fn loopback_bridge() -> TellstickNet {
    TellstickNet::new(BridgeConfig {
        listen_address: Ipv4Addr::LOCALHOST,
        command_port: 0,
        broadcast_address: Ipv4Addr::LOCALHOST,
        discovery_port: 9,
        ..Default::default()
    })
}

#[test]
fn test_announcement_and_status_flow() {
    let bridge = loopback_bridge();
    let listen_addr = bridge.start().unwrap();
    let events = bridge.events();

    let device = UdpSocket::bind("127.0.0.1:0").unwrap();
    device.send_to(b"TellStickNet:ACCA54000000:ABCDEF:17", listen_addr).unwrap();
    device.send_to(b"TSNETRC data:;\r\n", listen_addr).unwrap();
    device.send_to(b"TSNETRCfoo\r\n", listen_addr).unwrap();

    assert_eq!(
        events.recv_timeout(TIMEOUT).unwrap(),
        BridgeEvent::TellstickDetected {
            mac: "ACCA54000000".to_string(),
            activation_code: "ABCDEF".to_string(),
            version: "17".to_string(),
            source: LOCALHOST,
        }
    );
    // The keep-alive is swallowed, the status report follows in order
    assert_eq!(
        events.recv_timeout(TIMEOUT).unwrap(),
        BridgeEvent::MessageReceived {
            data: "foo".to_string(),
            source: LOCALHOST,
        }
    );

    assert_eq!(bridge.registry().snapshot(), vec![LOCALHOST]);
    bridge.stop();
}

#[test]
fn test_unrecognized_traffic_registers_sender() {
    let bridge = loopback_bridge();
    let listen_addr = bridge.start().unwrap();

    let device = UdpSocket::bind("127.0.0.1:0").unwrap();
    device.send_to(b"hello?", listen_addr).unwrap();
    device.send_to(b"TSNETRCping\r\n", listen_addr).unwrap();

    // Wait for the second datagram so the first is known to be processed
    let event = bridge.events().recv_timeout(TIMEOUT).unwrap();
    assert_eq!(event.source(), LOCALHOST);
    assert_eq!(bridge.registry().len(), 1);
    bridge.stop();
}

#[test]
fn test_no_events_after_stop() {
    let bridge = loopback_bridge();
    let listen_addr = bridge.start().unwrap();
    let events = bridge.events();
    bridge.stop();

    let device = UdpSocket::bind("127.0.0.1:0").unwrap();
    let _ = device.send_to(b"TSNETRCfoo\r\n", listen_addr);

    assert!(events.recv_timeout(Duration::from_millis(300)).is_err());
}

#[test]
fn test_command_reaches_every_bridge() {
    let bridge_a = UdpSocket::bind("127.0.0.1:0").unwrap();
    bridge_a.set_read_timeout(Some(TIMEOUT)).unwrap();
    let port = bridge_a.local_addr().unwrap().port();

    let registry = Arc::new(BridgeRegistry::new());
    registry.add(LOCALHOST);
    // IPv6 targets cannot be reached from the IPv4 send socket; the failure
    // must not prevent delivery to the other bridge
    registry.add("::1".parse().unwrap());

    let sender = CommandSender::new(Arc::clone(&registry), port);
    let command = DeviceCommand::dim(12_345, 2, 9).unwrap();
    let envelope = frame(&command.encode(), 8, 15);
    assert_eq!(sender.send(&envelope), 1);

    let mut buf = [0u8; 512];
    let (len, _) = bridge_a.recv_from(&mut buf).unwrap();
    assert_eq!(&buf[..len], envelope.as_bytes());
    assert!(buf[..len].starts_with(b"4:sendh1:S94:"));
}

#[test]
fn test_undrained_events_stay_bounded() {
    let bridge = loopback_bridge();
    let listen_addr = bridge.start().unwrap();

    let device = UdpSocket::bind("127.0.0.1:0").unwrap();
    for i in 0..(EVENT_QUEUE_CAPACITY * 2) {
        device
            .send_to(format!("TSNETRCstatus{}\r\n", i).as_bytes(), listen_addr)
            .unwrap();
        if i % 64 == 0 {
            // Keep the socket buffer from overflowing before the queue does
            std::thread::sleep(Duration::from_millis(5));
        }
    }
    // Let the listener work through the socket buffer
    std::thread::sleep(Duration::from_millis(500));

    let events = bridge.events();
    assert!(events.len() <= EVENT_QUEUE_CAPACITY);
    match events.recv_timeout(TIMEOUT).unwrap() {
        BridgeEvent::MessageReceived { data, .. } => assert_eq!(data, "status0"),
        other => panic!("unexpected event {:?}", other),
    }
    bridge.stop();
}

use std::net::Ipv4Addr;

use open_mqtt_charger::config::{
    Addressing, BrokerAddress, NetworkAttachment, QoS, StaticAddressing, CONFIG,
};
use open_mqtt_charger::telemetry::Channel;
use open_mqtt_charger::topic;

#[test]
fn shipped_cfg_validates() {
    assert_eq!(CONFIG.validate(), Ok(()));
}

#[test]
fn broker_parameters() {
    assert_eq!(CONFIG.mqtt.server, "192.168.1.17");
    assert_eq!(
        CONFIG.mqtt.address(),
        BrokerAddress::Ip(Ipv4Addr::new(192, 168, 1, 17))
    );
    assert_eq!(CONFIG.mqtt.port, 1883);
    assert_eq!(
        CONFIG.mqtt.credentials(),
        Some(("your_username", Some("your_password")))
    );
    assert_eq!(CONFIG.client_id(), "OpenMQTTCharger");
}

#[test]
fn timing_and_trace() {
    assert_eq!(CONFIG.cycle_time_ms, 5000);
    assert!(CONFIG.trace);
    assert_eq!(CONFIG.log_level(), log::LevelFilter::Debug);
}

#[test]
fn last_will_and_announcement() {
    assert_eq!(CONFIG.will.topic, "home/OpenMQTTCharger/LWT");
    assert_eq!(CONFIG.will.qos, QoS::AtMostOnce);
    assert!(CONFIG.will.retain);
    assert_eq!(CONFIG.will.message, "Offline");
    assert_eq!(CONFIG.announcement_message, "Online");
}

#[test]
fn topics() {
    assert_eq!(CONFIG.topics.commands, "home/commands/OpenMQTTCharger/#");
    assert_eq!(CONFIG.publish_topic(Channel::Voltage), "home/OpenMQTTCharger/Volt");
    assert_eq!(CONFIG.publish_topic(Channel::Current), "home/OpenMQTTCharger/Current");
    assert_eq!(CONFIG.publish_topic(Channel::Power), "home/OpenMQTTCharger/Power");

    for channel in Channel::ALL {
        assert!(!topic::matches(CONFIG.topics.commands, CONFIG.publish_topic(channel)));
    }
}

#[test]
fn network() {
    assert_eq!(
        CONFIG.network.attachment,
        NetworkAttachment::Wifi {
            ssid: "wifi ssid",
            password: "wifi password",
        }
    );
    assert_eq!(
        CONFIG.network.addressing,
        Addressing::Static(StaticAddressing {
            ip: Ipv4Addr::new(192, 168, 1, 99),
            gateway: Ipv4Addr::new(192, 168, 1, 1),
            dns: Ipv4Addr::new(192, 168, 1, 1),
            subnet: Ipv4Addr::new(255, 255, 255, 0),
        })
    );
}

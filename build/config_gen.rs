//! Turns `cfg.toml` text into the `CONFIG` constant included by `src/config.rs`.

use serde::Deserialize;

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default = "default_gateway_name")]
    gateway_name: String,
    #[serde(default = "default_cycle_time_ms")]
    cycle_time_ms: u32,
    #[serde(default = "default_trace")]
    trace: bool,
    #[serde(default = "default_announcement_message")]
    announcement_message: String,
    mqtt: RawMqtt,
    #[serde(default)]
    will: RawWill,
    #[serde(default)]
    topics: RawTopics,
    network: RawNetwork,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawMqtt {
    server: String,
    #[serde(default = "default_mqtt_port")]
    port: u16,
    user: Option<String>,
    password: Option<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields, default)]
struct RawWill {
    topic: String,
    qos: u8,
    retain: bool,
    message: String,
}

impl Default for RawWill {
    fn default() -> Self {
        Self {
            topic: "home/OpenMQTTCharger/LWT".into(),
            qos: 0,
            retain: true,
            message: "Offline".into(),
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields, default)]
struct RawTopics {
    commands: String,
    voltage: String,
    current: String,
    power: String,
}

impl Default for RawTopics {
    fn default() -> Self {
        Self {
            commands: "home/commands/OpenMQTTCharger/#".into(),
            voltage: "home/OpenMQTTCharger/Volt".into(),
            current: "home/OpenMQTTCharger/Current".into(),
            power: "home/OpenMQTTCharger/Power".into(),
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawNetwork {
    wifi: Option<RawWifi>,
    ethernet: Option<RawEthernet>,
    #[serde(rename = "static")]
    static_addressing: Option<RawStatic>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawWifi {
    ssid: String,
    #[serde(default)]
    password: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawEthernet {
    mac: [u8; 6],
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawStatic {
    ip: [u8; 4],
    gateway: [u8; 4],
    dns: [u8; 4],
    subnet: [u8; 4],
}

fn default_gateway_name() -> String {
    "OpenMQTTCharger".into()
}

fn default_cycle_time_ms() -> u32 {
    5000
}

fn default_trace() -> bool {
    true
}

fn default_announcement_message() -> String {
    "Online".into()
}

fn default_mqtt_port() -> u16 {
    1883
}

fn ipv4(octets: [u8; 4]) -> String {
    format!(
        "Ipv4Addr::new({}, {}, {}, {})",
        octets[0], octets[1], octets[2], octets[3]
    )
}

fn qos(level: u8) -> Result<&'static str, String> {
    match level {
        0 => Ok("QoS::AtMostOnce"),
        1 => Ok("QoS::AtLeastOnce"),
        2 => Ok("QoS::ExactlyOnce"),
        other => Err(format!("will.qos must be 0, 1 or 2, got {other}")),
    }
}

fn attachment(network: &RawNetwork) -> Result<String, String> {
    match (&network.wifi, &network.ethernet) {
        (Some(wifi), None) => Ok(format!(
            "NetworkAttachment::Wifi {{ ssid: {:?}, password: {:?} }}",
            wifi.ssid, wifi.password
        )),
        (None, Some(ethernet)) => Ok(format!(
            "NetworkAttachment::Ethernet {{ mac: MacAddress({:#04x?}) }}",
            ethernet.mac
        )),
        _ => Err("exactly one of [network.wifi] or [network.ethernet] must be set".into()),
    }
}

fn addressing(network: &RawNetwork) -> String {
    match &network.static_addressing {
        Some(s) => format!(
            "Addressing::Static(StaticAddressing {{ ip: {}, gateway: {}, dns: {}, subnet: {} }})",
            ipv4(s.ip),
            ipv4(s.gateway),
            ipv4(s.dns),
            ipv4(s.subnet)
        ),
        None => "Addressing::Dhcp".into(),
    }
}

/// Parses a configuration file and renders it as Rust source.
pub fn generate(toml_str: &str) -> Result<String, String> {
    let raw: RawConfig = toml::from_str(toml_str).map_err(|e| e.to_string())?;

    let code = format!(
        r#"
        pub const CONFIG: Config = Config {{
            gateway_name: {name:?},
            cycle_time_ms: {cycle},
            trace: {trace},
            announcement_message: {announce:?},
            mqtt: MqttBroker {{
                server: {server:?},
                port: {port},
                user: {user:?},
                password: {password:?},
            }},
            will: LastWill {{
                topic: {will_topic:?},
                qos: {will_qos},
                retain: {will_retain},
                message: {will_message:?},
            }},
            topics: Topics {{
                commands: {commands:?},
                voltage: {voltage:?},
                current: {current:?},
                power: {power:?},
            }},
            network: Network {{
                attachment: {attachment},
                addressing: {addressing},
            }},
        }};
    "#,
        name = raw.gateway_name,
        cycle = raw.cycle_time_ms,
        trace = raw.trace,
        announce = raw.announcement_message,
        server = raw.mqtt.server,
        port = raw.mqtt.port,
        user = raw.mqtt.user,
        password = raw.mqtt.password,
        will_topic = raw.will.topic,
        will_qos = qos(raw.will.qos)?,
        will_retain = raw.will.retain,
        will_message = raw.will.message,
        commands = raw.topics.commands,
        voltage = raw.topics.voltage,
        current = raw.topics.current,
        power = raw.topics.power,
        attachment = attachment(&raw.network)?,
        addressing = addressing(&raw.network),
    );

    Ok(code)
}

use core::fmt;
use core::net::Ipv4Addr;

use log::LevelFilter;

use crate::constants::{
    HOSTNAME_MAX_LEN, MQTT_KEEP_ALIVE_SECS, MQTT_MAX_PAYLOAD, WIFI_PASSWORD_MAX_LEN,
    WIFI_PASSWORD_MIN_LEN, WIFI_SSID_MAX_LEN,
};
pub use crate::network::{MacAddress, StaticAddressing};
use crate::telemetry::Channel;
use crate::{network, topic};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    // Charger name (MQTT client id and DHCP hostname)
    pub gateway_name: &'static str,

    // Time between voltage and current measurements in milliseconds
    pub cycle_time_ms: u32,

    // Debug trace on the serial log
    pub trace: bool,

    // Published on the will topic once connected, the counterpart of the will message
    pub announcement_message: &'static str,

    // Broker connection parameters
    pub mqtt: MqttBroker,

    // Message the broker publishes when the charger drops off
    pub will: LastWill,

    // Command filter and measurement topics
    pub topics: Topics,

    // Network attachment and addressing
    pub network: Network,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MqttBroker {
    // Broker IPv4 address or hostname
    pub server: &'static str,

    // Broker port (usually 1883)
    pub port: u16,

    // Only needed if the broker requires authentication
    pub user: Option<&'static str>,
    pub password: Option<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LastWill {
    pub topic: &'static str,
    pub qos: QoS,
    pub retain: bool,
    pub message: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum QoS {
    AtMostOnce,
    AtLeastOnce,
    ExactlyOnce,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Topics {
    // Filter subscribed to for inbound commands
    pub commands: &'static str,
    pub voltage: &'static str,
    pub current: &'static str,
    pub power: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Network {
    pub attachment: NetworkAttachment,
    pub addressing: Addressing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkAttachment {
    // Wi-Fi boards; an empty password joins an open network
    Wifi {
        ssid: &'static str,
        password: &'static str,
    },
    // Wired boards with an Ethernet shield
    Ethernet { mac: MacAddress },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Addressing {
    Dhcp,
    Static(StaticAddressing),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrokerAddress {
    Ip(Ipv4Addr),
    Hostname(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    EmptyBrokerServer,
    ZeroBrokerPort,
    PasswordWithoutUser,
    ZeroCycleTime,
    InvalidGatewayName,
    InvalidSsid,
    InvalidWifiPassword,
    Network(network::Error),
    Topic {
        field: &'static str,
        error: topic::Error,
    },
    CommandTopicOverlap {
        field: &'static str,
    },
    PayloadTooLong {
        field: &'static str,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::EmptyBrokerServer => f.write_str("mqtt.server is empty"),
            Error::ZeroBrokerPort => f.write_str("mqtt.port is 0"),
            Error::PasswordWithoutUser => f.write_str("mqtt.password is set without mqtt.user"),
            Error::ZeroCycleTime => f.write_str("cycle_time_ms is 0"),
            Error::InvalidGatewayName => write!(
                f,
                "gateway_name must be 1-{} ASCII letters, digits or '-'",
                HOSTNAME_MAX_LEN
            ),
            Error::InvalidSsid => write!(f, "wifi ssid must be 1-{} bytes", WIFI_SSID_MAX_LEN),
            Error::InvalidWifiPassword => write!(
                f,
                "wifi password must be empty, a {}-{} byte passphrase or {} hex digits",
                WIFI_PASSWORD_MIN_LEN,
                WIFI_PASSWORD_MAX_LEN - 1,
                WIFI_PASSWORD_MAX_LEN
            ),
            Error::Network(e) => write!(f, "network: {}", e),
            Error::Topic { field, error } => write!(f, "{}: {}", field, error),
            Error::CommandTopicOverlap { field } => {
                write!(f, "{} is matched by the command filter", field)
            }
            Error::PayloadTooLong { field } => {
                write!(f, "{} exceeds {} bytes", field, MQTT_MAX_PAYLOAD)
            }
        }
    }
}

impl From<network::Error> for Error {
    fn from(e: network::Error) -> Self {
        Error::Network(e)
    }
}

impl QoS {
    pub fn level(self) -> u8 {
        self as u8
    }
}

impl MqttBroker {
    /// User name and optional password, `None` for an anonymous connect.
    pub fn credentials(&self) -> Option<(&'static str, Option<&'static str>)> {
        self.user.map(|user| (user, self.password))
    }

    pub fn address(&self) -> BrokerAddress {
        match self.server.parse::<Ipv4Addr>() {
            Ok(ip) => BrokerAddress::Ip(ip),
            Err(_) => BrokerAddress::Hostname(self.server),
        }
    }
}

// WPA2-PSK: an 8-63 byte passphrase, or the raw 256-bit key as 64 hex digits
fn valid_wifi_password(password: &str) -> bool {
    match password.len() {
        0 => true,
        WIFI_PASSWORD_MAX_LEN => password.bytes().all(|b| b.is_ascii_hexdigit()),
        len => (WIFI_PASSWORD_MIN_LEN..WIFI_PASSWORD_MAX_LEN).contains(&len),
    }
}

fn valid_hostname(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= HOSTNAME_MAX_LEN
        && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
        && !name.starts_with('-')
        && !name.ends_with('-')
}

impl Config {
    pub fn log_level(&self) -> LevelFilter {
        if self.trace {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        }
    }

    pub fn client_id(&self) -> &'static str {
        self.gateway_name
    }

    pub fn cycle_time_millis(&self) -> u64 {
        self.cycle_time_ms.into()
    }

    /// Longest single wait for inbound traffic before the session loop runs again.
    ///
    /// Bounded by half the keep-alive so the broker never times the
    /// charger out while it idles.
    pub fn service_interval_ms(&self) -> u64 {
        let keep_alive_ms = u64::from(MQTT_KEEP_ALIVE_SECS) * 1000;
        self.cycle_time_millis().min(keep_alive_ms / 2)
    }

    pub fn publish_topic(&self, channel: Channel) -> &'static str {
        match channel {
            Channel::Voltage => self.topics.voltage,
            Channel::Current => self.topics.current,
            Channel::Power => self.topics.power,
        }
    }

    fn publish_topics(&self) -> [(&'static str, &'static str); 4] {
        [
            ("topics.voltage", self.topics.voltage),
            ("topics.current", self.topics.current),
            ("topics.power", self.topics.power),
            ("will.topic", self.will.topic),
        ]
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.mqtt.server.is_empty() {
            return Err(Error::EmptyBrokerServer);
        }
        if self.mqtt.port == 0 {
            return Err(Error::ZeroBrokerPort);
        }
        if self.mqtt.password.is_some() && self.mqtt.user.is_none() {
            return Err(Error::PasswordWithoutUser);
        }
        if self.cycle_time_ms == 0 {
            return Err(Error::ZeroCycleTime);
        }
        if !valid_hostname(self.gateway_name) {
            return Err(Error::InvalidGatewayName);
        }

        match self.network.attachment {
            NetworkAttachment::Wifi { ssid, password } => {
                if ssid.is_empty() || ssid.len() > WIFI_SSID_MAX_LEN {
                    return Err(Error::InvalidSsid);
                }
                if !valid_wifi_password(password) {
                    return Err(Error::InvalidWifiPassword);
                }
            }
            NetworkAttachment::Ethernet { mac } => mac.validate()?,
        }

        if let Addressing::Static(addressing) = self.network.addressing {
            addressing.validate()?;
        }

        topic::validate_filter(self.topics.commands).map_err(|error| Error::Topic {
            field: "topics.commands",
            error,
        })?;

        for (field, name) in self.publish_topics() {
            topic::validate_name(name).map_err(|error| Error::Topic { field, error })?;
            if topic::matches(self.topics.commands, name) {
                return Err(Error::CommandTopicOverlap { field });
            }
        }

        for (field, payload) in [
            ("will.message", self.will.message),
            ("announcement_message", self.announcement_message),
        ] {
            if payload.len() > MQTT_MAX_PAYLOAD {
                return Err(Error::PayloadTooLong { field });
            }
        }

        Ok(())
    }
}

// config values are generated at compile time from cfg.toml
include!(concat!(env!("OUT_DIR"), "/config.rs"));

/// Current firmware version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Size of the heap in DRAM, mostly used by the Wi-Fi driver
pub const HEAP_SIZE: usize = 72 * 1024;

/// Size of the TCP socket receive buffer
pub const RX_BUFFER_SIZE: usize = 4096;
/// Size of the TCP socket transmit buffer
pub const TX_BUFFER_SIZE: usize = 4096;
/// Socket inactivity timeout in seconds
pub const SOCKET_TIMEOUT_SECS: u64 = 30;

/// Size of the MQTT client receive buffer for application data
pub const MQTT_RX_BUFFER_SIZE: usize = 1024;
/// Size of the MQTT client transmit buffer for application data
pub const MQTT_TX_BUFFER_SIZE: usize = 1024;
/// Maximum number of MQTT v5 properties attached to a packet
pub const MQTT_MAX_PROPERTIES: usize = 5;
/// Largest will or announcement payload accepted from the configuration
pub const MQTT_MAX_PAYLOAD: usize = 256;
/// MQTT keep-alive negotiated with the broker
pub const MQTT_KEEP_ALIVE_SECS: u16 = 30;
/// Delay before opening a new MQTT session after a failure
pub const MQTT_RECONNECT_DELAY_MS: u64 = 5000;

/// Longest DHCP hostname the network stack accepts
pub const HOSTNAME_MAX_LEN: usize = 32;

/// Longest SSID in an 802.11 beacon
pub const WIFI_SSID_MAX_LEN: usize = 32;
/// Shortest WPA2 passphrase
pub const WIFI_PASSWORD_MIN_LEN: usize = 8;
/// Length of a raw WPA2 key written as hex digits; passphrases stop one short of it
pub const WIFI_PASSWORD_MAX_LEN: usize = 64;

/// Time allowed for a single Wi-Fi association attempt
pub const WIFI_CONNECT_TIMEOUT_SECS: u64 = 30;
/// Delay between Wi-Fi association attempts
pub const WIFI_RECONNECT_DELAY_MS: u64 = 5000;

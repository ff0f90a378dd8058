#![no_std]
#![no_main]

use static_cell::StaticCell;

use embassy_executor::Spawner;
use embassy_net::Stack;
use embassy_time::{Duration, Timer};

use esp_alloc as _;
use esp_backtrace as _;
use esp_hal::{rng::Rng, timer::timg::TimerGroup};
use esp_println::logger::init_logger;

mod mqtt;
mod transport;
mod wifi;

use mqtt::Mqtt;
use open_mqtt_charger::config::CONFIG;
use open_mqtt_charger::constants::*;
use open_mqtt_charger::telemetry::Channel;
use open_mqtt_charger::topic;
use transport::IdleDeadline;
use wifi::Wifi;

esp_bootloader_esp_idf::esp_app_desc!();

static RADIO: StaticCell<esp_radio::Controller<'static>> = StaticCell::new();

static RX_BUF: StaticCell<[u8; RX_BUFFER_SIZE]> = StaticCell::new();
static TX_BUF: StaticCell<[u8; TX_BUFFER_SIZE]> = StaticCell::new();
static MQTT_RX_BUF: StaticCell<[u8; MQTT_RX_BUFFER_SIZE]> = StaticCell::new();
static MQTT_TX_BUF: StaticCell<[u8; MQTT_TX_BUFFER_SIZE]> = StaticCell::new();

struct Buffers {
    rx: &'static mut [u8; RX_BUFFER_SIZE],
    tx: &'static mut [u8; TX_BUFFER_SIZE],
    mqtt_rx: &'static mut [u8; MQTT_RX_BUFFER_SIZE],
    mqtt_tx: &'static mut [u8; MQTT_TX_BUFFER_SIZE],
}

#[derive(Debug)]
#[allow(dead_code)]
enum SessionError {
    Transport(transport::Error),
    Mqtt(mqtt::Error),
}

#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    init_logger(CONFIG.log_level());

    let peripherals = esp_hal::init(esp_hal::Config::default());

    esp_alloc::heap_allocator!(size: HEAP_SIZE);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    log::info!("{} firmware {}", CONFIG.gateway_name, VERSION);

    if let Err(e) = CONFIG.validate() {
        log::error!("Invalid cfg.toml: {}", e);
        halt().await
    }

    for channel in Channel::ALL {
        log::debug!(
            "{:?} ({}) published on {}",
            channel,
            channel.unit(),
            CONFIG.publish_topic(channel)
        );
    }

    // possibly high transient required at init
    // https://github.com/esp-rs/esp-hal/issues/1626
    Timer::after(Duration::from_millis(1000)).await;

    let rng = Rng::new();
    let radio = RADIO.init(esp_radio::init().expect("Failed to initialize radio controller"));

    let wifi = match Wifi::new(radio, peripherals.WIFI, rng.clone(), spawner).await {
        Ok(wifi) => wifi,
        Err(e) => {
            log::error!("Network attachment failed: {:?}", e);
            halt().await
        }
    };

    if let Err(e) = wifi.connect().await {
        log::error!("Network connection failed: {:?}", e);
        halt().await
    }

    let mut buffers = Buffers {
        rx: RX_BUF.init([0; RX_BUFFER_SIZE]),
        tx: TX_BUF.init([0; TX_BUFFER_SIZE]),
        mqtt_rx: MQTT_RX_BUF.init([0; MQTT_RX_BUFFER_SIZE]),
        mqtt_tx: MQTT_TX_BUF.init([0; MQTT_TX_BUFFER_SIZE]),
    };

    loop {
        let seed = u64::from(rng.random());
        if let Err(e) = session(wifi.stack, &mut buffers, seed).await {
            log::error!("MQTT session ended: {:?}", e);
        }
        Timer::after(Duration::from_millis(MQTT_RECONNECT_DELAY_MS)).await;
    }
}

/// One broker connection, from TCP connect until the first failure.
async fn session(stack: Stack<'static>, buffers: &mut Buffers, seed: u64) -> Result<(), SessionError> {
    let idle = IdleDeadline::default();
    let transport = transport::open(
        stack,
        &mut buffers.rx[..],
        &mut buffers.tx[..],
        &idle,
        CONFIG.mqtt.address(),
        CONFIG.mqtt.port,
    )
    .await
    .map_err(SessionError::Transport)?;

    let mut mqtt = Mqtt::connect(
        transport,
        &idle,
        &mut buffers.mqtt_tx[..],
        &mut buffers.mqtt_rx[..],
        seed,
    )
    .await
    .map_err(SessionError::Mqtt)?;

    mqtt.announce().await.map_err(SessionError::Mqtt)?;
    mqtt.subscribe_commands().await.map_err(SessionError::Mqtt)?;

    let service_ms = CONFIG.service_interval_ms();
    loop {
        // inbound commands do not count towards the broker's keep-alive
        if mqtt.keep_alive_due() {
            mqtt.keep_alive().await.map_err(SessionError::Mqtt)?;
            continue;
        }

        let until = mqtt.wait_until(service_ms);
        if let Some((name, payload)) = mqtt.next_message(until).await.map_err(SessionError::Mqtt)? {
            log_command(name, payload);
        }
    }
}

fn log_command(name: &str, payload: &[u8]) {
    match topic::command_suffix(CONFIG.topics.commands, name) {
        Some(command) => log::debug!("Command {:?} received ({} bytes)", command, payload.len()),
        None => log::debug!("Message on {} ignored ({} bytes)", name, payload.len()),
    }
}

async fn halt() -> ! {
    loop {
        Timer::after(Duration::from_secs(3600)).await;
    }
}

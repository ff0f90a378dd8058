use embassy_time::Instant;
use embedded_io_async::{Read, Write};
use rust_mqtt::{
    client::{
        client::MqttClient,
        client_config::{ClientConfig, MqttVersion},
    },
    packet::v5::{publish_packet::QualityOfService, reason_codes::ReasonCode},
    utils::rng_generator::CountingRng,
};

use open_mqtt_charger::config::{QoS, CONFIG};
use open_mqtt_charger::constants::{MQTT_KEEP_ALIVE_SECS, MQTT_MAX_PROPERTIES};
use open_mqtt_charger::keep_alive::KeepAlive;

use crate::transport::IdleDeadline;

#[derive(Debug)]
#[allow(dead_code)]
pub enum Error {
    ConnectionFailed(ReasonCode),
    AnnounceFailed(ReasonCode),
    SubscribeFailed(ReasonCode),
    ReceiveFailed(ReasonCode),
    KeepAliveFailed(ReasonCode),
}

fn quality_of_service(qos: QoS) -> QualityOfService {
    match qos {
        QoS::AtMostOnce => QualityOfService::QoS0,
        QoS::AtLeastOnce => QualityOfService::QoS1,
        QoS::ExactlyOnce => QualityOfService::QoS2,
    }
}

fn now_ms() -> u64 {
    Instant::now().as_millis()
}

pub struct Mqtt<'a, T>
where
    T: Read + Write,
{
    client: MqttClient<'a, T, MQTT_MAX_PROPERTIES, CountingRng>,
    idle: &'a IdleDeadline,
    keep_alive: KeepAlive,
}

impl<'a, T> Mqtt<'a, T>
where
    T: Read + Write,
{
    /// Connects with the configured client id, credentials and last will.
    ///
    /// `idle` must be the deadline the transport reads against.
    pub async fn connect(
        transport: T,
        idle: &'a IdleDeadline,
        tx_buffer: &'a mut [u8],
        rx_buffer: &'a mut [u8],
        seed: u64,
    ) -> Result<Self, Error> {
        let mut config = ClientConfig::new(MqttVersion::MQTTv5, CountingRng(seed));
        config.add_max_subscribe_qos(QualityOfService::QoS1);
        config.add_client_id(CONFIG.client_id());
        config.keep_alive = MQTT_KEEP_ALIVE_SECS;
        config.max_packet_size = rx_buffer.len() as u32;

        if let Some((user, password)) = CONFIG.mqtt.credentials() {
            config.add_username(user);
            if let Some(password) = password {
                config.add_password(password);
            }
        }

        if CONFIG.will.qos != QoS::AtMostOnce {
            log::warn!(
                "Will QoS {} is not supported by the client, the broker will use 0",
                CONFIG.will.qos.level()
            );
        }
        config.add_will(
            CONFIG.will.topic,
            CONFIG.will.message.as_bytes(),
            CONFIG.will.retain,
        );

        let tx_len = tx_buffer.len();
        let rx_len = rx_buffer.len();
        let mut client = MqttClient::new(transport, tx_buffer, tx_len, rx_buffer, rx_len, config);

        idle.disarm();
        match client.connect_to_broker().await {
            Ok(()) => {
                log::info!("MQTT connected to broker as {}", CONFIG.client_id());
            }
            Err(e) => {
                log::error!("MQTT connect_to_broker failed: {:?}", e);
                return Err(Error::ConnectionFailed(e));
            }
        }

        Ok(Self {
            client,
            idle,
            keep_alive: KeepAlive::new(MQTT_KEEP_ALIVE_SECS, now_ms()),
        })
    }

    async fn publish_status(&mut self, qos: QualityOfService) -> Result<(), ReasonCode> {
        self.client
            .send_message(
                CONFIG.will.topic,
                CONFIG.announcement_message.as_bytes(),
                qos,
                CONFIG.will.retain,
            )
            .await?;
        self.keep_alive.sent(now_ms());
        Ok(())
    }

    /// Publishes the announcement on the will topic so it replaces a stale will.
    pub async fn announce(&mut self) -> Result<(), Error> {
        self.publish_status(quality_of_service(CONFIG.will.qos))
            .await
            .map_err(|e| {
                log::error!("Failed to publish announcement: {:?}", e);
                Error::AnnounceFailed(e)
            })?;

        log::info!(
            "Announced {:?} on {}",
            CONFIG.announcement_message,
            CONFIG.will.topic
        );
        Ok(())
    }

    pub async fn subscribe_commands(&mut self) -> Result<(), Error> {
        self.client
            .subscribe_to_topic(CONFIG.topics.commands)
            .await
            .map_err(Error::SubscribeFailed)?;
        self.keep_alive.sent(now_ms());

        log::info!("Subscribed to {}", CONFIG.topics.commands);
        Ok(())
    }

    pub fn keep_alive_due(&self) -> bool {
        self.keep_alive.is_due(now_ms())
    }

    /// End of the next receive wait: `service_ms` from now, or the keep-alive deadline if sooner.
    pub fn wait_until(&self, service_ms: u64) -> Instant {
        let now = now_ms();
        Instant::from_millis(now + self.keep_alive.wait_ms(now, service_ms))
    }

    /// Republishes the status at QoS 0. Any client packet resets the broker's
    /// keep-alive timer, and a QoS 0 publish expects no reply that could
    /// interleave with inbound commands.
    pub async fn keep_alive(&mut self) -> Result<(), Error> {
        self.publish_status(QualityOfService::QoS0)
            .await
            .map_err(Error::KeepAliveFailed)?;
        log::debug!("MQTT keep-alive sent");
        Ok(())
    }

    /// Waits until `until` for an inbound publish. `None` means no packet began
    /// arriving in time; a packet that did is always read to the end.
    pub async fn next_message(&mut self, until: Instant) -> Result<Option<(&str, &[u8])>, Error> {
        self.idle.arm(until);
        let received = self.client.receive_message().await;
        self.idle.disarm();

        match received {
            Ok(message) => Ok(Some(message)),
            Err(_) if self.idle.timed_out() => Ok(None),
            Err(e) => Err(Error::ReceiveFailed(e)),
        }
    }
}

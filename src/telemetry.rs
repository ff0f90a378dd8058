/// Measurement channels that each have their own outbound topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Voltage,
    Current,
    Power,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Voltage, Channel::Current, Channel::Power];

    pub fn unit(self) -> &'static str {
        match self {
            Channel::Voltage => "V",
            Channel::Current => "A",
            Channel::Power => "W",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn units() {
        let units: [&str; 3] = Channel::ALL.map(Channel::unit);
        assert_eq!(units, ["V", "A", "W"]);
    }
}

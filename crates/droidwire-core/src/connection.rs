//! Network connection state of an Android device.
//!
//! The Appium server reports the connection as a bitmask: airplane mode is
//! bit 0, Wi-Fi bit 1 and mobile data bit 2. Any combination can occur (Wi-Fi
//! may be re-enabled while airplane mode is on), so the raw bits are kept as
//! reported and the common states are named constants.

use std::fmt;
use std::str::FromStr;

const AIRPLANE_BIT: i64 = 1;
const WIFI_BIT: i64 = 2;
const DATA_BIT: i64 = 4;

/// Device network connection bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionType(i64);

impl ConnectionType {
    /// No connectivity.
    pub const NONE: ConnectionType = ConnectionType(0);
    /// Airplane mode on, all radios off.
    pub const AIRPLANE_MODE: ConnectionType = ConnectionType(AIRPLANE_BIT);
    /// Wi-Fi only.
    pub const WIFI_ONLY: ConnectionType = ConnectionType(WIFI_BIT);
    /// Mobile data only.
    pub const DATA_ONLY: ConnectionType = ConnectionType(DATA_BIT);
    /// Wi-Fi and mobile data.
    pub const ALL_NETWORK_ON: ConnectionType = ConnectionType(WIFI_BIT | DATA_BIT);

    const NAMED: [(&'static str, ConnectionType); 5] = [
        ("none", ConnectionType::NONE),
        ("airplane", ConnectionType::AIRPLANE_MODE),
        ("wifi", ConnectionType::WIFI_ONLY),
        ("data", ConnectionType::DATA_ONLY),
        ("all", ConnectionType::ALL_NETWORK_ON),
    ];

    /// Wraps a raw bitmask as reported by the server.
    pub const fn from_bits(bits: i64) -> Self {
        ConnectionType(bits)
    }

    /// The bitmask value sent on the wire.
    pub fn bitmask(self) -> i64 {
        self.0
    }

    pub fn airplane_mode(self) -> bool {
        self.0 & AIRPLANE_BIT != 0
    }

    pub fn wifi(self) -> bool {
        self.0 & WIFI_BIT != 0
    }

    pub fn data(self) -> bool {
        self.0 & DATA_BIT != 0
    }

    /// The short name of a common state, if this is one.
    pub fn name(self) -> Option<&'static str> {
        Self::NAMED
            .iter()
            .find(|(_, kind)| *kind == self)
            .map(|(name, _)| *name)
    }
}

impl From<i64> for ConnectionType {
    fn from(bits: i64) -> Self {
        ConnectionType(bits)
    }
}

impl fmt::Display for ConnectionType {
    /// Named states print their name, anything else the raw bitmask.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name}"),
            None => write!(f, "{}", self.0),
        }
    }
}

impl FromStr for ConnectionType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if let Some((_, kind)) = Self::NAMED.iter().find(|(name, _)| *name == value) {
            return Ok(*kind);
        }
        match value.parse::<i64>() {
            Ok(bits) if bits >= 0 => Ok(ConnectionType(bits)),
            _ => Err(format!(
                "unknown connection type `{value}`; expected a bitmask or one of: none, airplane, wifi, data, all"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_states_have_documented_bits() {
        assert_eq!(ConnectionType::NONE.bitmask(), 0);
        assert_eq!(ConnectionType::AIRPLANE_MODE.bitmask(), 1);
        assert_eq!(ConnectionType::WIFI_ONLY.bitmask(), 2);
        assert_eq!(ConnectionType::DATA_ONLY.bitmask(), 4);
        assert_eq!(ConnectionType::ALL_NETWORK_ON.bitmask(), 6);
        assert_eq!(ConnectionType::from(6), ConnectionType::ALL_NETWORK_ON);
    }

    #[test]
    fn combined_bits_keep_every_flag() {
        let kind = ConnectionType::from(3);
        assert!(kind.airplane_mode());
        assert!(kind.wifi());
        assert!(!kind.data());
        assert_eq!(kind.name(), None);

        let all = ConnectionType::from_bits(7);
        assert!(all.airplane_mode() && all.wifi() && all.data());
    }

    #[test]
    fn flag_accessors() {
        assert!(ConnectionType::ALL_NETWORK_ON.wifi());
        assert!(ConnectionType::ALL_NETWORK_ON.data());
        assert!(!ConnectionType::ALL_NETWORK_ON.airplane_mode());
        assert!(ConnectionType::AIRPLANE_MODE.airplane_mode());
        assert!(!ConnectionType::NONE.wifi());
    }

    #[test]
    fn parses_names_and_numbers() {
        assert_eq!("wifi".parse::<ConnectionType>(), Ok(ConnectionType::WIFI_ONLY));
        assert_eq!("6".parse::<ConnectionType>(), Ok(ConnectionType::ALL_NETWORK_ON));
        assert_eq!("5".parse::<ConnectionType>(), Ok(ConnectionType::from(5)));
        assert!("bluetooth".parse::<ConnectionType>().is_err());
        assert!("-1".parse::<ConnectionType>().is_err());
    }

    #[test]
    fn display_matches_from_str() {
        for kind in [ConnectionType::DATA_ONLY, ConnectionType::from(3)] {
            assert_eq!(kind.to_string().parse::<ConnectionType>(), Ok(kind));
        }
        assert_eq!(ConnectionType::from(7).to_string(), "7");
    }
}

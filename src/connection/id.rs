//! Connection identity
//!
//! The transport names each client by 19 bytes: a 16-byte address, the
//! port in network order, and a family selector. On the control channel
//! and in outbound frames the same bytes travel as lowercase hex.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::protocol::{HostAddress, HostFamily};

/// Size of a raw connection id
pub const CONNECTION_ID_LEN: usize = 19;

/// Family selector value for IPv4 peers; anything else is IPv6
const FAMILY_IPV4: u8 = 4;

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId([u8; CONNECTION_ID_LEN]);

impl ConnectionId {
    pub fn new(bytes: [u8; CONNECTION_ID_LEN]) -> Self {
        ConnectionId(bytes)
    }

    /// Build an id for a peer address, the way the transport does
    pub fn from_peer(ip: IpAddr, port: u16) -> Self {
        let mut bytes = [0u8; CONNECTION_ID_LEN];
        match ip {
            IpAddr::V4(v4) => {
                bytes[..4].copy_from_slice(&v4.octets());
                bytes[18] = FAMILY_IPV4;
            }
            IpAddr::V6(v6) => {
                bytes[..16].copy_from_slice(&v6.octets());
                bytes[18] = 6;
            }
        }
        bytes[16..18].copy_from_slice(&port.to_be_bytes());
        ConnectionId(bytes)
    }

    /// The id at the front of a data frame, if the frame is long enough
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let raw: [u8; CONNECTION_ID_LEN] = bytes.get(..CONNECTION_ID_LEN)?.try_into().ok()?;
        Some(ConnectionId(raw))
    }

    /// Parse the 38-character hex form used on the control channel
    pub fn from_hex(text: &str) -> Option<Self> {
        if text.len() != CONNECTION_ID_LEN * 2 || !text.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let mut bytes = [0u8; CONNECTION_ID_LEN];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&text[i * 2..i * 2 + 2], 16).ok()?;
        }
        Some(ConnectionId(bytes))
    }

    pub fn to_hex(&self) -> String {
        self.0.iter().map(|byte| format!("{:02x}", byte)).collect()
    }

    pub fn as_bytes(&self) -> &[u8; CONNECTION_ID_LEN] {
        &self.0
    }

    pub fn family(&self) -> HostFamily {
        if self.0[18] == FAMILY_IPV4 {
            HostFamily::Internet
        } else {
            HostFamily::InternetV6
        }
    }

    pub fn address(&self) -> IpAddr {
        match self.family() {
            HostFamily::Internet => {
                IpAddr::V4(Ipv4Addr::new(self.0[0], self.0[1], self.0[2], self.0[3]))
            }
            _ => {
                let mut octets = [0u8; 16];
                octets.copy_from_slice(&self.0[..16]);
                IpAddr::V6(Ipv6Addr::from(octets))
            }
        }
    }

    pub fn port(&self) -> u16 {
        u16::from_be_bytes([self.0[16], self.0[17]])
    }

    /// The peer as an access-control host entry
    pub fn host_address(&self) -> HostAddress {
        HostAddress::from_ip(self.address())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let family = match self.family() {
            HostFamily::Internet => "Internet",
            _ => "InternetV6",
        };
        write!(f, "{}[{}]:{}", family, self.address(), self.port())
    }
}

impl fmt::Debug for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConnectionId({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ipv4_id() {
        let mut raw = [0u8; CONNECTION_ID_LEN];
        raw[..4].copy_from_slice(&[192, 168, 1, 20]);
        raw[16..18].copy_from_slice(&6000u16.to_be_bytes());
        raw[18] = 4;
        let id = ConnectionId::new(raw);

        assert_eq!(id.family(), HostFamily::Internet);
        assert_eq!(id.address(), "192.168.1.20".parse::<IpAddr>().unwrap());
        assert_eq!(id.port(), 6000);
        assert_eq!(id.to_string(), "Internet[192.168.1.20]:6000");
        assert_eq!(id.host_address().address, vec![192, 168, 1, 20]);
    }

    #[test]
    fn test_ipv6_id() {
        let ip: IpAddr = "fe80::1".parse().unwrap();
        let id = ConnectionId::from_peer(ip, 42);
        assert_eq!(id.family(), HostFamily::InternetV6);
        assert_eq!(id.address(), ip);
        assert_eq!(id.to_string(), "InternetV6[fe80::1]:42");
    }

    #[test]
    fn test_hex_form() {
        let id = ConnectionId::from_peer("10.0.0.1".parse().unwrap(), 0x1770);
        let hex = id.to_hex();
        assert_eq!(hex.len(), 38);
        assert!(hex.starts_with("0a000001"));
        assert!(hex.ends_with("177004"));
        assert_eq!(ConnectionId::from_hex(&hex), Some(id));
        assert_eq!(ConnectionId::from_hex(&hex.to_uppercase()), Some(id));
    }

    #[test]
    fn test_rejects_bad_hex() {
        assert_eq!(ConnectionId::from_hex("abc"), None);
        assert_eq!(ConnectionId::from_hex(&"zz".repeat(19)), None);
        assert_eq!(ConnectionId::from_hex(&"é".repeat(19)), None);

        // from_str_radix alone would take "+a" as 10
        let signed = format!("+a{}", "00".repeat(18));
        assert_eq!(signed.len(), 38);
        assert_eq!(ConnectionId::from_hex(&signed), None);
    }

    #[test]
    fn test_from_slice() {
        let frame = [7u8; 25];
        let id = ConnectionId::from_slice(&frame).unwrap();
        assert_eq!(id.as_bytes(), &[7u8; 19]);
        assert!(ConnectionId::from_slice(&frame[..18]).is_none());
    }
}

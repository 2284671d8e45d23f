use crate::{SinkError, constants::BD_ADDR_LENGTH};

/// Hardware address (`BD_ADDR`) of the remote host
///
/// The all-zero address is the "no remembered peer" sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PeerAddress(pub [u8; BD_ADDR_LENGTH]);

impl PeerAddress {
    /// The "no remembered peer" sentinel
    pub const UNSET: Self = Self([0; BD_ADDR_LENGTH]);

    /// Create a new peer address from bytes
    #[must_use]
    pub const fn new(addr: [u8; BD_ADDR_LENGTH]) -> Self {
        Self(addr)
    }

    /// Get the raw address bytes
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; BD_ADDR_LENGTH] {
        &self.0
    }

    /// Whether this is the all-zero sentinel
    #[must_use]
    pub fn is_unset(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }

    /// Format the address as a colon-separated hex string
    #[must_use]
    pub fn format_hex(&self) -> heapless::String<17> {
        const HEX: &[u8; 16] = b"0123456789ABCDEF";

        let mut result = heapless::String::new();
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                result.push(':').ok();
            }
            result.push(char::from(HEX[usize::from(byte >> 4)])).ok();
            result.push(char::from(HEX[usize::from(byte & 0x0F)])).ok();
        }
        result
    }

    /// Parse a peer address from a colon-separated hex string
    ///
    /// # Errors
    /// Returns `SinkError::InvalidParameter` if the string is not six
    /// colon-separated hex octets
    pub fn from_hex(hex: &str) -> Result<Self, SinkError> {
        if hex.len() != 17 || !hex.chars().all(|c| c.is_ascii_hexdigit() || c == ':') {
            return Err(SinkError::InvalidParameter);
        }

        let mut bytes = [0u8; BD_ADDR_LENGTH];
        let mut count = 0;
        for (i, octet) in hex.split(':').enumerate() {
            if i >= BD_ADDR_LENGTH || octet.len() != 2 {
                return Err(SinkError::InvalidParameter);
            }
            bytes[i] = u8::from_str_radix(octet, 16).map_err(|_| SinkError::InvalidParameter)?;
            count += 1;
        }
        if count != BD_ADDR_LENGTH {
            return Err(SinkError::InvalidParameter);
        }
        Ok(Self(bytes))
    }
}

impl core::fmt::Display for PeerAddress {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.format_hex().as_str())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for PeerAddress {
    fn format(&self, f: defmt::Formatter<'_>) {
        let b = &self.0;
        defmt::write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            b[0],
            b[1],
            b[2],
            b[3],
            b[4],
            b[5]
        );
    }
}

impl From<[u8; BD_ADDR_LENGTH]> for PeerAddress {
    fn from(addr: [u8; BD_ADDR_LENGTH]) -> Self {
        Self(addr)
    }
}

impl From<PeerAddress> for [u8; BD_ADDR_LENGTH] {
    fn from(addr: PeerAddress) -> Self {
        addr.0
    }
}

impl From<PeerAddress> for bt_hci::param::BdAddr {
    fn from(addr: PeerAddress) -> Self {
        bt_hci::param::BdAddr::new(addr.0)
    }
}

impl TryFrom<&str> for PeerAddress {
    type Error = SinkError;

    fn try_from(hex: &str) -> Result<Self, Self::Error> {
        PeerAddress::from_hex(hex)
    }
}

impl TryFrom<&[u8]> for PeerAddress {
    type Error = SinkError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let addr: [u8; BD_ADDR_LENGTH] = bytes
            .try_into()
            .map_err(|_| SinkError::InvalidParameter)?;
        Ok(PeerAddress(addr))
    }
}

impl TryFrom<bt_hci::param::BdAddr> for PeerAddress {
    type Error = SinkError;

    fn try_from(bd_addr: bt_hci::param::BdAddr) -> Result<Self, Self::Error> {
        bd_addr.raw().try_into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peer_address_creation() {
        let addr = PeerAddress::new([0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]);
        assert_eq!(addr.as_bytes(), &[0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]);
        assert!(!addr.is_unset());
    }

    #[test]
    fn test_peer_address_sentinel() {
        assert!(PeerAddress::UNSET.is_unset());
        assert!(PeerAddress::default().is_unset());
        assert_eq!(PeerAddress::default(), PeerAddress::UNSET);

        // A single non-zero octet anywhere is a real address
        assert!(!PeerAddress::new([0, 0, 0, 0, 0, 1]).is_unset());
        assert!(!PeerAddress::new([1, 0, 0, 0, 0, 0]).is_unset());
    }

    #[test]
    fn test_peer_address_format_hex() {
        let addr = PeerAddress::new([0x0A, 0xB1, 0x2C, 0xD3, 0x4E, 0xF5]);
        assert_eq!(addr.format_hex().as_str(), "0A:B1:2C:D3:4E:F5");
        assert_eq!(PeerAddress::UNSET.format_hex().as_str(), "00:00:00:00:00:00");
    }

    #[test]
    fn test_peer_address_from_hex() {
        let addr = PeerAddress::from_hex("AA:BB:CC:DD:EE:FF").unwrap();
        assert_eq!(addr.as_bytes(), &[0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]);

        let lower: PeerAddress = "aa:bb:cc:dd:ee:ff".try_into().unwrap();
        assert_eq!(lower, addr);

        assert!(PeerAddress::from_hex("AA:BB:CC:DD:EE").is_err());
        assert!(PeerAddress::from_hex("AA-BB-CC-DD-EE-FF").is_err());
        assert!(PeerAddress::from_hex("AAB:B:CC:DD:EE:FF").is_err());
        assert!(PeerAddress::from_hex("GG:BB:CC:DD:EE:FF").is_err());
    }

    #[test]
    fn test_peer_address_try_from_slice() {
        let bytes = &[0x12u8, 0x34, 0x56, 0x78, 0x9A, 0xBC][..];
        let addr = PeerAddress::try_from(bytes).unwrap();
        assert_eq!(addr.as_bytes(), &[0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC]);

        assert_eq!(
            PeerAddress::try_from(&[0x12u8, 0x34, 0x56][..]),
            Err(SinkError::InvalidParameter)
        );
        assert!(PeerAddress::try_from(&[0u8; 8][..]).is_err());
    }

    #[test]
    fn test_peer_address_bd_addr_conversion() {
        let addr = PeerAddress::new([0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC]);
        let bd_addr: bt_hci::param::BdAddr = addr.into();
        assert_eq!(bd_addr.raw(), addr.as_bytes());

        let back = PeerAddress::try_from(bd_addr).unwrap();
        assert_eq!(back, addr);
    }
}

use byteorder_slice::{BigEndian, ByteOrder, LittleEndian};

/// Endianness of a PcapNg section.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum Endianness {
    /// Big endian
    Big,
    /// Little endian
    #[default]
    Little,
}

impl Endianness {
    /// Returns true if the endianness is little endian
    pub fn is_little(self) -> bool {
        self == Endianness::Little
    }

    /// Reads a `u16` from the start of `buf`.
    ///
    /// The caller guarantees that `buf` holds at least 2 bytes.
    pub(crate) fn read_u16(self, buf: &[u8]) -> u16 {
        match self {
            Endianness::Big => BigEndian::read_u16(buf),
            Endianness::Little => LittleEndian::read_u16(buf),
        }
    }

    /// Reads a `u32` from the start of `buf`.
    ///
    /// The caller guarantees that `buf` holds at least 4 bytes.
    pub(crate) fn read_u32(self, buf: &[u8]) -> u32 {
        match self {
            Endianness::Big => BigEndian::read_u32(buf),
            Endianness::Little => LittleEndian::read_u32(buf),
        }
    }

    /// Reads a `u64` from the start of `buf`.
    ///
    /// The caller guarantees that `buf` holds at least 8 bytes.
    pub(crate) fn read_u64(self, buf: &[u8]) -> u64 {
        match self {
            Endianness::Big => BigEndian::read_u64(buf),
            Endianness::Little => LittleEndian::read_u64(buf),
        }
    }
}

/// Network byte order `u16` at `offset`, if the slice is long enough.
pub(crate) fn be_u16(buf: &[u8], offset: usize) -> Option<u16> {
    buf.get(offset..offset + 2).map(BigEndian::read_u16)
}

/// Link layer type of an interface.
///
/// Only the two link types carrying traffic this crate can demultiplex are
/// represented, any other value is rejected when the interface is declared.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum LinkType {
    /// IEEE 802.3 Ethernet
    Ethernet,
    /// Linux "cooked" capture encapsulation
    LinuxSll,
}

impl LinkType {
    /// LINKTYPE_ETHERNET
    pub const ETHERNET: u16 = 1;
    /// LINKTYPE_LINUX_SLL
    pub const LINUX_SLL: u16 = 113;

    /// Maps the raw link type of an Interface Description Block.
    pub fn from_raw(raw: u16) -> Option<Self> {
        match raw {
            Self::ETHERNET => Some(LinkType::Ethernet),
            Self::LINUX_SLL => Some(LinkType::LinuxSll),
            _ => None,
        }
    }

    /// The raw link type value.
    pub fn to_raw(self) -> u16 {
        match self {
            LinkType::Ethernet => Self::ETHERNET,
            LinkType::LinuxSll => Self::LINUX_SLL,
        }
    }

    /// Length of the link header preceding the ethertype field.
    pub(crate) fn header_len(self) -> usize {
        match self {
            // dst MAC + src MAC
            LinkType::Ethernet => 12,
            // packet type, ARPHRD, address length, 8 byte address
            LinkType::LinuxSll => 14,
        }
    }
}

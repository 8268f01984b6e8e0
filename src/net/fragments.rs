//! IPv4 fragment reassembly.

use std::time::Duration;

use crate::config::DEFAULT_FRAGMENT_TIMEOUT;

/// Outcome of [`IpFragments::add_fragment`].
///
/// Every `Invalid*` result means the fragments collected so far can't be
/// reassembled, the collection must be discarded.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum FragmentResult {
    /// The fragment was stored, more fragments are expected.
    Incomplete,
    /// The fragment completed the datagram, see [`IpFragments::fragments`].
    Reassembled,
    /// The fragment overlaps a stored fragment.
    InvalidOverlap,
    /// The fragment arrived too long after the previous one.
    InvalidTimeOut,
    /// The fragment is located after the last fragment.
    InvalidOffset,
    /// The fragment was already stored.
    InvalidDuplicate,
    /// A last fragment was already stored.
    InvalidDuplicateLastPacket,
}

impl FragmentResult {
    /// Returns true for the results requiring the collection to be discarded.
    pub fn is_invalid(self) -> bool {
        !matches!(self, FragmentResult::Incomplete | FragmentResult::Reassembled)
    }
}

/// One IPv4 fragment, owning a copy of its payload.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IpFragment {
    offset: usize,
    checksum: u16,
    data: Vec<u8>,
    position: u64,
}

impl IpFragment {
    /// Offset of the fragment in the datagram, in bytes.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// IPv4 header checksum of the packet carrying the fragment.
    pub fn checksum(&self) -> u16 {
        self.checksum
    }

    /// Payload of the fragment.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Position of the payload in the capture stream.
    pub fn position(&self) -> u64 {
        self.position
    }

    fn end(&self) -> usize {
        self.offset + self.data.len()
    }
}

/// Fragments of one IPv4 datagram, kept sorted by offset as they arrive.
///
/// Stored fragments never overlap. A failed [`add_fragment`](IpFragments::add_fragment)
/// leaves the collection untouched.
#[derive(Clone, Debug)]
pub struct IpFragments {
    fragment_id: u16,
    timeout: Duration,
    fragments: Vec<IpFragment>,
    has_last_fragment: bool,
    last_seen: Duration,
    first_timestamp: Option<Duration>,
}

impl IpFragments {
    /// Creates an empty collection for the IPv4 identification `fragment_id`.
    pub fn new(fragment_id: u16) -> Self {
        Self::with_timeout(fragment_id, DEFAULT_FRAGMENT_TIMEOUT)
    }

    /// Creates an empty collection with a custom reassembly timeout.
    pub fn with_timeout(fragment_id: u16, timeout: Duration) -> Self {
        IpFragments {
            fragment_id,
            timeout,
            fragments: Vec::new(),
            has_last_fragment: false,
            last_seen: Duration::ZERO,
            first_timestamp: None,
        }
    }

    /// IPv4 identification of the datagram.
    pub fn fragment_id(&self) -> u16 {
        self.fragment_id
    }

    /// Capture timestamp of the fragment at offset 0, once received.
    pub fn timestamp(&self) -> Option<Duration> {
        self.first_timestamp
    }

    /// Number of stored fragments.
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Returns true if no fragment is stored.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Stored fragments, by ascending offset.
    pub fn fragments(&self) -> &[IpFragment] {
        &self.fragments
    }

    /// Concatenated payloads of the stored fragments.
    pub fn reassemble(&self) -> Vec<u8> {
        let len = self.fragments.last().map_or(0, IpFragment::end);
        let mut datagram = Vec::with_capacity(len);
        for fragment in &self.fragments {
            datagram.extend_from_slice(&fragment.data);
        }
        datagram
    }

    fn is_expired(&self, timestamp: Duration) -> bool {
        if self.fragments.is_empty() {
            return false;
        }

        let elapsed = if timestamp > self.last_seen { timestamp - self.last_seen } else { self.last_seen - timestamp };
        elapsed > self.timeout
    }

    fn is_reassembled(&self) -> bool {
        if !self.has_last_fragment {
            return false;
        }

        let mut expected_offset = 0;
        for fragment in &self.fragments {
            if fragment.offset != expected_offset {
                return false;
            }
            expected_offset = fragment.end();
        }
        true
    }

    /// Adds a fragment.
    ///
    /// `offset` is in bytes, `more_fragments` is the MF flag of the packet. The payload is copied.
    pub fn add_fragment(
        &mut self,
        offset: usize,
        more_fragments: bool,
        checksum: u16,
        payload: &[u8],
        timestamp: Duration,
        position: u64,
    ) -> FragmentResult {
        if self.is_expired(timestamp) {
            return FragmentResult::InvalidTimeOut;
        }

        let end = offset + payload.len();
        let slot = if self.fragments.is_empty() {
            self.has_last_fragment = !more_fragments;
            self.fragments.len()
        }
        else if !more_fragments {
            if self.has_last_fragment {
                return FragmentResult::InvalidDuplicateLastPacket;
            }

            // The last fragment must come after everything stored
            if self.fragments.last().is_some_and(|last| offset < last.end()) {
                return FragmentResult::InvalidOffset;
            }

            self.has_last_fragment = true;
            self.fragments.len()
        }
        else {
            match self.interior_slot(offset, end, checksum, payload.len()) {
                Ok(slot) => slot,
                Err(result) => return result,
            }
        };

        self.fragments.insert(slot, IpFragment { offset, checksum, data: payload.to_vec(), position });
        self.last_seen = timestamp;
        if offset == 0 {
            self.first_timestamp = Some(timestamp);
        }

        if self.is_reassembled() { FragmentResult::Reassembled } else { FragmentResult::Incomplete }
    }

    /// Finds where a fragment that is not the last one goes.
    fn interior_slot(&self, offset: usize, end: usize, checksum: u16, len: usize) -> Result<usize, FragmentResult> {
        for (i, stored) in self.fragments.iter().enumerate() {
            if stored.offset == offset && stored.checksum == checksum && stored.data.len() == len {
                return Err(FragmentResult::InvalidDuplicate);
            }

            if end <= stored.offset {
                return Ok(i);
            }

            if offset < stored.end() {
                return Err(FragmentResult::InvalidOverlap);
            }
        }

        // Appending would place it after the last fragment
        if self.has_last_fragment {
            return Err(FragmentResult::InvalidOffset);
        }
        Ok(self.fragments.len())
    }
}

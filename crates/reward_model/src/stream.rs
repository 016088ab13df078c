//! Display/aggregation units derived from tranches

/// Mutually exclusive attribution of an amount on the timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StreamType {
    Earned,
    Unlocked,
    Locked,
    LockedPreview,
    Unclaimed,
}

impl StreamType {
    pub const ALL: [StreamType; 5] = [
        StreamType::Earned,
        StreamType::Unlocked,
        StreamType::Locked,
        StreamType::LockedPreview,
        StreamType::Unclaimed,
    ];

    #[inline]
    const fn slot(self) -> usize {
        match self {
            StreamType::Earned => 0,
            StreamType::Unlocked => 1,
            StreamType::Locked => 2,
            StreamType::LockedPreview => 3,
            StreamType::Unclaimed => 4,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            StreamType::Earned => "earned",
            StreamType::Unlocked => "unlocked",
            StreamType::Locked => "locked",
            StreamType::LockedPreview => "locked_preview",
            StreamType::Unclaimed => "unclaimed",
        }
    }
}

/// Scaled amount per stream type; every type has a slot, zero by default
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypedAmounts([u128; 5]);

impl TypedAmounts {
    /// All slots zero except `kind`
    #[inline]
    pub fn single(kind: StreamType, amount: u128) -> Self {
        let mut out = Self::default();
        out.0[kind.slot()] = amount;
        out
    }

    #[inline]
    pub fn get(&self, kind: StreamType) -> u128 {
        self.0[kind.slot()]
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|v| *v == 0)
    }

    /// (type, amount) pairs in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (StreamType, u128)> + '_ {
        StreamType::ALL.iter().map(move |k| (*k, self.get(*k)))
    }
}

/// A span of the timeline carrying one typed amount
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stream {
    pub kind: StreamType,
    pub start: u64,
    pub finish: u64,
    pub amount: u128,
    /// Originating tranche index, if the stream came from one
    pub index: Option<u32>,
}

impl Stream {
    #[inline]
    pub fn amounts(&self) -> TypedAmounts {
        TypedAmounts::single(self.kind, self.amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_sets_one_slot() {
        let a = TypedAmounts::single(StreamType::Locked, 7);
        assert_eq!(a.get(StreamType::Locked), 7);
        for (kind, v) in a.iter() {
            if kind != StreamType::Locked {
                assert_eq!(v, 0);
            }
        }
        assert!(!a.is_zero());
        assert!(TypedAmounts::default().is_zero());
    }
}

/// Header literal for a full machine state snapshot.
pub const STATE_HEADER: &str = "03090100state";
/// Header literal for a recorded input stream. Same envelope, different body.
pub const MOVIE_HEADER: &str = "03030000movie";

/// Byte written for `true`. Neither sentinel is 0 or 1 so that a misaligned read shows up.
pub const TRUE_PATTERN: u8 = 0xfe;
/// Byte written for `false`.
pub const FALSE_PATTERN: u8 = 0x01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnapshotKind {
    State,
    Movie,
}

impl SnapshotKind {
    pub fn header(self) -> &'static str {
        match self {
            SnapshotKind::State => STATE_HEADER,
            SnapshotKind::Movie => MOVIE_HEADER,
        }
    }

    /// Matches a raw header region against the reserved literals.
    pub fn from_header_bytes(header: &[u8]) -> Option<Self> {
        [SnapshotKind::State, SnapshotKind::Movie]
            .into_iter()
            .find(|kind| kind.header().as_bytes() == header)
    }

    pub fn from_header(header: &str) -> Option<Self> {
        match header {
            STATE_HEADER => Some(SnapshotKind::State),
            MOVIE_HEADER => Some(SnapshotKind::Movie),
            _ => None,
        }
    }
}

impl core::fmt::Display for SnapshotKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SnapshotKind::State => write!(f, "state({STATE_HEADER})"),
            SnapshotKind::Movie => write!(f, "movie({MOVIE_HEADER})"),
        }
    }
}

//! Game-mode partitions and the progress scale tracked for each of them.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Battle.net region a report belongs to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    /// Americas realm (`1` on the wire).
    Americas,
    /// Europe realm (`2` on the wire).
    Europe,
    /// Asia realm (`3` on the wire).
    Asia,
}

impl Region {
    /// Every region, in wire-code order.
    pub const ALL: [Region; 3] = [Region::Americas, Region::Europe, Region::Asia];

    /// Numeric code used by the status API.
    pub fn code(self) -> &'static str {
        match self {
            Region::Americas => "1",
            Region::Europe => "2",
            Region::Asia => "3",
        }
    }

    /// Parse a status API code.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|region| region.code() == code)
    }

    /// Parse the display name used by the walk API.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|region| region.label() == name)
    }

    /// Human readable name.
    pub fn label(self) -> &'static str {
        match self {
            Region::Americas => "Americas",
            Region::Europe => "Europe",
            Region::Asia => "Asia",
        }
    }

    /// Discord emoji shortcode.
    pub fn emoji(self) -> &'static str {
        match self {
            Region::Americas => ":flag_us:",
            Region::Europe => ":flag_eu:",
            Region::Asia => ":flag_kr:",
        }
    }
}

/// Ladder or non-ladder season.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Ladder {
    /// Seasonal ladder (`1` on the wire).
    Ladder,
    /// Non-ladder (`2` on the wire).
    NonLadder,
}

impl Ladder {
    /// Both ladder modes, in wire-code order.
    pub const ALL: [Ladder; 2] = [Ladder::Ladder, Ladder::NonLadder];

    /// Numeric code used by the status API.
    pub fn code(self) -> &'static str {
        match self {
            Ladder::Ladder => "1",
            Ladder::NonLadder => "2",
        }
    }

    /// Parse a status API code.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ladder| ladder.code() == code)
    }

    /// Map the boolean flag used by the walk API.
    pub fn from_flag(ladder: bool) -> Self {
        if ladder { Ladder::Ladder } else { Ladder::NonLadder }
    }

    /// Human readable name.
    pub fn label(self) -> &'static str {
        match self {
            Ladder::Ladder => "Ladder",
            Ladder::NonLadder => "Non-Ladder",
        }
    }

    /// Discord emoji shortcode.
    pub fn emoji(self) -> &'static str {
        match self {
            Ladder::Ladder => ":ladder:",
            Ladder::NonLadder => ":crossed_swords:",
        }
    }
}

/// Hardcore or softcore characters.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Core {
    /// Hardcore (`1` on the wire).
    Hardcore,
    /// Softcore (`2` on the wire).
    Softcore,
}

impl Core {
    /// Both modes, in wire-code order.
    pub const ALL: [Core; 2] = [Core::Hardcore, Core::Softcore];

    /// Numeric code used by the status API.
    pub fn code(self) -> &'static str {
        match self {
            Core::Hardcore => "1",
            Core::Softcore => "2",
        }
    }

    /// Parse a status API code.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|core| core.code() == code)
    }

    /// Map the boolean flag used by the walk API.
    pub fn from_flag(hardcore: bool) -> Self {
        if hardcore { Core::Hardcore } else { Core::Softcore }
    }

    /// Human readable name.
    pub fn label(self) -> &'static str {
        match self {
            Core::Hardcore => "Hardcore",
            Core::Softcore => "Softcore",
        }
    }

    /// Discord emoji shortcode.
    pub fn emoji(self) -> &'static str {
        match self {
            Core::Hardcore => ":skull_crossbones:",
            Core::Softcore => ":mage:",
        }
    }
}

/// One independently tracked (region, ladder, core) combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct Partition {
    /// Battle.net region.
    pub region: Region,
    /// Ladder mode.
    pub ladder: Ladder,
    /// Hardcore or softcore.
    pub core: Core,
}

impl Partition {
    /// Number of partitions the tracker holds.
    pub const COUNT: usize = Region::ALL.len() * Ladder::ALL.len() * Core::ALL.len();

    /// Combine the three axes into a partition.
    pub fn new(region: Region, ladder: Ladder, core: Core) -> Self {
        Self {
            region,
            ladder,
            core,
        }
    }

    /// Every partition, ordered by region, then ladder, then core.
    pub fn all() -> impl Iterator<Item = Partition> {
        Region::ALL.into_iter().flat_map(|region| {
            Ladder::ALL.into_iter().flat_map(move |ladder| {
                Core::ALL
                    .into_iter()
                    .map(move |core| Partition::new(region, ladder, core))
            })
        })
    }

    /// Key used when listing partitions to humans: core, then ladder, then region.
    pub fn display_order(&self) -> (Core, Ladder, Region) {
        (self.core, self.ladder, self.region)
    }

    /// Emoji triple for chat messages.
    pub fn emoji(&self) -> String {
        format!(
            "{} {} {}",
            self.region.emoji(),
            self.ladder.emoji(),
            self.core.emoji()
        )
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.region.label(),
            self.ladder.label(),
            self.core.label()
        )
    }
}

/// Progress on the 1..=6 scale; 1 is baseline, 6 means the spawn is imminent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProgressLevel(u8);

impl ProgressLevel {
    /// No activity; also the value progress resets to after a spawn.
    pub const BASELINE: ProgressLevel = ProgressLevel(1);
    /// Highest reportable level.
    pub const MAX: ProgressLevel = ProgressLevel(6);

    /// Build a level, rejecting anything outside 1..=6.
    pub fn new(value: u8) -> Option<Self> {
        (Self::BASELINE.0..=Self::MAX.0)
            .contains(&value)
            .then_some(Self(value))
    }

    /// Raw level in 1..=6.
    pub fn get(self) -> u8 {
        self.0
    }

    /// Whether this is level 1.
    pub fn is_baseline(self) -> bool {
        self == Self::BASELINE
    }
}

impl Default for ProgressLevel {
    fn default() -> Self {
        Self::BASELINE
    }
}

impl fmt::Display for ProgressLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Optional restriction on the partitions queried upstream; `None` is a wildcard.
///
/// Wildcards only ever appear in queries. The tracker always stores concrete partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionFilter {
    /// Region to query, any when `None`.
    pub region: Option<Region>,
    /// Ladder mode to query, any when `None`.
    pub ladder: Option<Ladder>,
    /// Core mode to query, any when `None`.
    pub core: Option<Core>,
}

impl Default for PartitionFilter {
    /// All regions and ladder modes, softcore only.
    fn default() -> Self {
        Self {
            region: None,
            ladder: None,
            core: Some(Core::Softcore),
        }
    }
}

impl PartitionFilter {
    /// Filter that matches every partition.
    pub fn any() -> Self {
        Self {
            region: None,
            ladder: None,
            core: None,
        }
    }

    /// Whether `partition` falls inside this filter.
    pub fn matches(&self, partition: &Partition) -> bool {
        self.region.is_none_or(|region| region == partition.region)
            && self.ladder.is_none_or(|ladder| ladder == partition.ladder)
            && self.core.is_none_or(|core| core == partition.core)
    }

    /// Query parameters understood by the status API; empty means no filter.
    pub fn query(&self) -> [(&'static str, &'static str); 3] {
        [
            ("region", self.region.map_or("", Region::code)),
            ("ladder", self.ladder.map_or("", Ladder::code)),
            ("hc", self.core.map_or("", Core::code)),
        ]
    }
}

impl fmt::Display for PartitionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let region = self.region.map_or("All Regions", Region::label);
        let ladder = self.ladder.map_or("Ladder and Non-Ladder", Ladder::label);
        let core = self.core.map_or("Hardcore and Softcore", Core::label);
        write!(f, "{region}, {ladder}, {core}")
    }
}

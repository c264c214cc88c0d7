//! The thirteen muscle groups and where their overlays are pasted.

use std::fmt;

/// A muscle group drawn on the body heatmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MuscleGroup {
    Lats,
    ErectorSpinae,
    Quadriceps,
    Chest,
    Glutes,
    Triceps,
    Traps,
    Biceps,
    FrontDelts,
    SideDelts,
    Core,
    Hamstrings,
    RearDelts,
}

impl MuscleGroup {
    /// All groups, in asset-table order.
    pub const ALL: [MuscleGroup; 13] = [
        MuscleGroup::Lats,
        MuscleGroup::ErectorSpinae,
        MuscleGroup::Quadriceps,
        MuscleGroup::Chest,
        MuscleGroup::Glutes,
        MuscleGroup::Triceps,
        MuscleGroup::Traps,
        MuscleGroup::Biceps,
        MuscleGroup::FrontDelts,
        MuscleGroup::SideDelts,
        MuscleGroup::Core,
        MuscleGroup::Hamstrings,
        MuscleGroup::RearDelts,
    ];

    /// Name used as the JSON key and as the asset file prefix.
    pub fn key(self) -> &'static str {
        match self {
            MuscleGroup::Lats => "광배근",
            MuscleGroup::ErectorSpinae => "기립근",
            MuscleGroup::Quadriceps => "대퇴사두",
            MuscleGroup::Chest => "대흉근",
            MuscleGroup::Glutes => "둔근",
            MuscleGroup::Triceps => "삼두",
            MuscleGroup::Traps => "승모근",
            MuscleGroup::Biceps => "이두근",
            MuscleGroup::FrontDelts => "전면어깨",
            MuscleGroup::SideDelts => "측면어깨",
            MuscleGroup::Core => "코어",
            MuscleGroup::Hamstrings => "햄스트링",
            MuscleGroup::RearDelts => "후면어깨",
        }
    }

    /// Top-left pixel where this group's overlay is pasted on the base image.
    pub fn origin(self) -> (i64, i64) {
        match self {
            MuscleGroup::Lats => (117, 241),
            MuscleGroup::ErectorSpinae => (950, 441),
            MuscleGroup::Quadriceps => (101, 575),
            MuscleGroup::Chest => (130, 225),
            MuscleGroup::Glutes => (883, 534),
            MuscleGroup::Triceps => (0, 275),
            MuscleGroup::Traps => (130, 132),
            MuscleGroup::Biceps => (47, 295),
            MuscleGroup::FrontDelts => (84, 219),
            MuscleGroup::SideDelts => (51, 213),
            MuscleGroup::Core => (154, 344),
            MuscleGroup::Hamstrings => (884, 705),
            MuscleGroup::RearDelts => (818, 200),
        }
    }

    /// Position of this group in [`MuscleGroup::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Overlay asset file name for a given intensity bucket.
    pub fn asset_name(self, bucket: u8) -> String {
        format!("{}{}.png", self.key(), bucket)
    }
}

impl fmt::Display for MuscleGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

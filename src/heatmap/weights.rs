//! Request body for the heatmap endpoint.

use serde::{Deserialize, Deserializer, Serialize};

use super::groups::MuscleGroup;

/// Per-group training weights. Missing groups default to zero.
///
/// Keys are the Korean group names; English snake_case aliases are accepted
/// on input. Values may be JSON integers or floats (truncated toward zero).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightVector {
    #[serde(rename = "광배근", alias = "lats", default, deserialize_with = "lenient_weight")]
    pub lats: i64,
    #[serde(rename = "기립근", alias = "erector_spinae", default, deserialize_with = "lenient_weight")]
    pub erector_spinae: i64,
    #[serde(rename = "대퇴사두", alias = "quadriceps", default, deserialize_with = "lenient_weight")]
    pub quadriceps: i64,
    #[serde(rename = "대흉근", alias = "chest", default, deserialize_with = "lenient_weight")]
    pub chest: i64,
    #[serde(rename = "둔근", alias = "glutes", default, deserialize_with = "lenient_weight")]
    pub glutes: i64,
    #[serde(rename = "삼두", alias = "triceps", default, deserialize_with = "lenient_weight")]
    pub triceps: i64,
    #[serde(rename = "승모근", alias = "traps", default, deserialize_with = "lenient_weight")]
    pub traps: i64,
    #[serde(rename = "이두근", alias = "biceps", default, deserialize_with = "lenient_weight")]
    pub biceps: i64,
    #[serde(rename = "전면어깨", alias = "front_delts", default, deserialize_with = "lenient_weight")]
    pub front_delts: i64,
    #[serde(rename = "측면어깨", alias = "side_delts", default, deserialize_with = "lenient_weight")]
    pub side_delts: i64,
    #[serde(rename = "코어", alias = "core", default, deserialize_with = "lenient_weight")]
    pub core: i64,
    #[serde(rename = "햄스트링", alias = "hamstrings", default, deserialize_with = "lenient_weight")]
    pub hamstrings: i64,
    #[serde(rename = "후면어깨", alias = "rear_delts", default, deserialize_with = "lenient_weight")]
    pub rear_delts: i64,
}

impl WeightVector {
    /// Weight recorded for `group`.
    pub fn get(&self, group: MuscleGroup) -> i64 {
        match group {
            MuscleGroup::Lats => self.lats,
            MuscleGroup::ErectorSpinae => self.erector_spinae,
            MuscleGroup::Quadriceps => self.quadriceps,
            MuscleGroup::Chest => self.chest,
            MuscleGroup::Glutes => self.glutes,
            MuscleGroup::Triceps => self.triceps,
            MuscleGroup::Traps => self.traps,
            MuscleGroup::Biceps => self.biceps,
            MuscleGroup::FrontDelts => self.front_delts,
            MuscleGroup::SideDelts => self.side_delts,
            MuscleGroup::Core => self.core,
            MuscleGroup::Hamstrings => self.hamstrings,
            MuscleGroup::RearDelts => self.rear_delts,
        }
    }

    /// Iterate over `(group, weight)` pairs in table order.
    pub fn iter(&self) -> impl Iterator<Item = (MuscleGroup, i64)> + '_ {
        MuscleGroup::ALL.iter().map(move |group| (*group, self.get(*group)))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawWeight {
    Int(i64),
    Float(f64),
}

fn lenient_weight<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawWeight::deserialize(deserializer)? {
        RawWeight::Int(value) => value,
        // `as` saturates and maps NaN to 0
        RawWeight::Float(value) => value as i64,
    })
}

use serde::{Deserialize, Serialize};

pub const MAX_SCORE: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Clarity,
    Energy,
    Professionalism,
    Creativity,
    Emotion,
}

impl Axis {
    pub const ALL: [Axis; 5] = [
        Axis::Clarity,
        Axis::Energy,
        Axis::Professionalism,
        Axis::Creativity,
        Axis::Emotion,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Axis::Clarity => "Clarity",
            Axis::Energy => "Energy",
            Axis::Professionalism => "Professionalism",
            Axis::Creativity => "Creativity",
            Axis::Emotion => "Emotion",
        }
    }

    fn index(self) -> usize {
        match self {
            Axis::Clarity => 0,
            Axis::Energy => 1,
            Axis::Professionalism => 2,
            Axis::Creativity => 3,
            Axis::Emotion => 4,
        }
    }
}

/// Five-axis score vector attached to every rewrite.
///
/// Values are always within `0..=100`; constructors clamp anything larger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinguisticDna([u8; 5]);

impl LinguisticDna {
    /// Substituted when the reply carried no recoverable scores.
    pub const NEUTRAL: LinguisticDna = LinguisticDna([50; 5]);
    /// Attached to failed transformations.
    pub const ZERO: LinguisticDna = LinguisticDna([0; 5]);

    pub fn new(values: [u32; 5]) -> Self {
        Self(values.map(clamp_score))
    }

    /// Takes the first five values, or `None` when fewer are available.
    pub fn from_leading(values: &[u32]) -> Option<Self> {
        let leading: [u32; 5] = values.get(..5)?.try_into().ok()?;
        Some(Self::new(leading))
    }

    pub fn get(&self, axis: Axis) -> u8 {
        self.0[axis.index()]
    }

    pub fn values(&self) -> [u8; 5] {
        self.0
    }

    pub fn axes(&self) -> impl Iterator<Item = (Axis, u8)> + '_ {
        Axis::ALL.iter().map(move |axis| (*axis, self.get(*axis)))
    }

    pub fn clarity(&self) -> u8 {
        self.get(Axis::Clarity)
    }

    /// Mean of energy and emotion, rounded down.
    pub fn impact(&self) -> u8 {
        ((u16::from(self.get(Axis::Energy)) + u16::from(self.get(Axis::Emotion))) / 2) as u8
    }

    pub fn to_csv(&self) -> String {
        self.0
            .iter()
            .map(u8::to_string)
            .collect::<Vec<String>>()
            .join(",")
    }
}

impl Default for LinguisticDna {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

fn clamp_score(value: u32) -> u8 {
    value.min(u32::from(MAX_SCORE)) as u8
}

#[cfg(test)]
mod tests {
    use super::{Axis, LinguisticDna};

    #[test]
    fn new_clamps_out_of_range_values() {
        let dna = LinguisticDna::new([80, 150, 100, 0, 999]);
        assert_eq!(dna.values(), [80, 100, 100, 0, 100]);
    }

    #[test]
    fn from_leading_requires_five_values() {
        assert_eq!(LinguisticDna::from_leading(&[1, 2, 3, 4]), None);
        assert_eq!(
            LinguisticDna::from_leading(&[10, 20, 30, 40, 50, 60]).map(|dna| dna.values()),
            Some([10, 20, 30, 40, 50])
        );
    }

    #[test]
    fn axes_follow_fixed_order() {
        let dna = LinguisticDna::new([1, 2, 3, 4, 5]);
        let labels: Vec<(&str, u8)> = dna.axes().map(|(axis, v)| (axis.label(), v)).collect();
        assert_eq!(
            labels,
            vec![
                ("Clarity", 1),
                ("Energy", 2),
                ("Professionalism", 3),
                ("Creativity", 4),
                ("Emotion", 5),
            ]
        );
        assert_eq!(dna.get(Axis::Creativity), 4);
    }

    #[test]
    fn impact_averages_energy_and_emotion() {
        assert_eq!(LinguisticDna::new([0, 71, 0, 0, 80]).impact(), 75);
        assert_eq!(LinguisticDna::ZERO.impact(), 0);
    }

    #[test]
    fn serializes_as_plain_array() -> anyhow::Result<()> {
        let dna = LinguisticDna::new([80, 70, 60, 50, 40]);
        assert_eq!(serde_json::to_string(&dna)?, "[80,70,60,50,40]");
        assert_eq!(dna.to_csv(), "80,70,60,50,40");
        Ok(())
    }
}

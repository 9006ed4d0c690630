
use crate::textgrid::Interval;

/// For each word interval, the indices of the phone intervals lying inside
/// it, in phone order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContainmentGroups {
  pub groups: Vec<Vec<usize>>,
}

impl ContainmentGroups {
  pub fn phones_in(&self, word: usize) -> &[usize] {
    self.groups.get(word).map(|g| g.as_slice()).unwrap_or(&[])
  }

  pub fn len(&self) -> usize {
    self.groups.len()
  }

  pub fn is_empty(&self) -> bool {
    self.groups.is_empty()
  }
}

/// Containment is inclusive at both ends, so a phone sharing a boundary with
/// two adjacent words only falls in the one that spans it completely.
pub fn align(phones: &[Interval], words: &[Interval]) -> ContainmentGroups {
  let groups = words.iter().map(|w| {
    phones.iter().enumerate()
      .filter(|(_, p)| w.contains(p))
      .map(|(i, _)| i)
      .collect()
  }).collect();

  ContainmentGroups { groups }
}

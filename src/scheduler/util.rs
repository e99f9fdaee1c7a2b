use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeSet;
use std::fmt;

/// Prédicat de jour férié : aucun audit n'est planifié ces jours-là.
pub trait HolidayCalendar: fmt::Debug {
    fn is_holiday(&self, date: NaiveDate) -> bool;
}

/// Règle par défaut : le dimanche est chômé.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sundays;

impl HolidayCalendar for Sundays {
    fn is_holiday(&self, date: NaiveDate) -> bool {
        date.weekday() == Weekday::Sun
    }
}

/// Dimanches plus une liste de dates fériées (calendrier régional).
#[derive(Debug, Default, Clone)]
pub struct SundaysAnd {
    dates: BTreeSet<NaiveDate>,
}

impl SundaysAnd {
    pub fn new<I: IntoIterator<Item = NaiveDate>>(dates: I) -> Self {
        Self {
            dates: dates.into_iter().collect(),
        }
    }
}

impl HolidayCalendar for SundaysAnd {
    fn is_holiday(&self, date: NaiveDate) -> bool {
        Sundays.is_holiday(date) || self.dates.contains(&date)
    }
}

/// Source d'aléa pour le choix des lignes CQE / Plant Head.
pub trait LinePicker: fmt::Debug {
    /// Index uniforme dans `0..len` (`len > 0`).
    fn pick(&mut self, len: usize) -> usize;
}

#[derive(Debug, Clone)]
pub struct RandomPicker {
    rng: StdRng,
}

impl RandomPicker {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl LinePicker for RandomPicker {
    fn pick(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        self.rng.gen_range(0..len)
    }
}

/// `items` tourné pour commencer à `offset % len`.
pub(super) fn rotated<'a>(items: &[&'a str], offset: usize) -> Vec<&'a str> {
    if items.is_empty() {
        return Vec::new();
    }
    let start = offset % items.len();
    items[start..].iter().chain(&items[..start]).copied().collect()
}

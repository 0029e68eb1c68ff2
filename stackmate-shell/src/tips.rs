//! Rotating developer tips.

use rand::seq::IteratorRandom;
use rand::Rng;
use std::collections::HashSet;

pub const DEV_TIPS: &[&str] = &[
    "Write code that tells a story - future you will thank present you.",
    "'Code is read more often than it is written' - Always optimize for readability.",
    "Debug with print statements, but don't forget to remove them!",
    "'The best code is no code at all' - Sometimes deletion is the best refactor.",
    "Learn your editor's shortcuts - they compound over time.",
    "'Make it work, make it right, make it fast' - in that order.",
    "'There are only two hard things in Computer Science: cache invalidation and naming things.'",
    "Read the error message twice before searching for it.",
    "'Code never lies, comments sometimes do' - Keep them in sync.",
    "'Premature optimization is the root of all evil' - Donald Knuth",
    "'Programs must be written for people to read, and only incidentally for machines to execute.'",
    "'First, solve the problem. Then, write the code.'",
    "'Simplicity is the ultimate sophistication.' - Leonardo da Vinci",
    "'There's nothing more permanent than a temporary solution that works.'",
    "'Code is like humor. When you have to explain it, it's bad.'",
    "Don't repeat yourself - if you're copying code, consider making it a function.",
    "Use meaningful variable names - 'data' and 'temp' tell you nothing.",
    "Fail fast and fail loud - catch errors early and make them obvious.",
    "Keep functions small - if it doesn't fit on your screen, it's too long.",
    "Read other people's code - it's the fastest way to learn new patterns.",
    "Error handling is not optional - plan for things to go wrong.",
    "Automate repetitive tasks - your time is better spent solving problems.",
    "Performance problems are usually data structure problems in disguise.",
    "The compiler is your friend - let it catch errors for you.",
    "Understand your dependencies - they're part of your codebase now.",
    "Learn to refactor safely - small changes reduce risk.",
    "The best debugging tool is a good night's sleep.",
    "Don't write clever code - write clear code that works.",
    "Ask for help when you're stuck - fresh eyes see new solutions.",
    "Keep learning - technology evolves, and so should you.",
];

/// Draws tips at random, never repeating one until every tip has been shown.
#[derive(Debug, Default)]
pub struct DevTips {
    shown: HashSet<usize>,
}

impl DevTips {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_tip(&mut self) -> &'static str {
        self.next_tip_with(&mut rand::thread_rng())
    }

    pub fn next_tip_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> &'static str {
        if self.shown.len() >= DEV_TIPS.len() {
            self.shown.clear();
        }
        let idx = (0..DEV_TIPS.len())
            .filter(|i| !self.shown.contains(i))
            .choose(rng)
            .unwrap_or(0);
        self.shown.insert(idx);
        log::debug!("Showing tip {idx}, {} left this cycle", self.remaining());
        DEV_TIPS[idx]
    }

    /// Tips left before the cycle restarts.
    pub fn remaining(&self) -> usize {
        DEV_TIPS.len() - self.shown.len()
    }
}

//! Public types for the Cardseer API.

mod card;

pub use card::{Ability, Attack, Card, CardImages, CardList, CardSet};

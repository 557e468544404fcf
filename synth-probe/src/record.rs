use std::fmt;
use std::ops::RangeInclusive;

use rand::distributions::{Distribution, Standard};
use rand::Rng;

pub const NAME_PREFIX: &str = "User_";
pub const NAME_SUFFIX_LEN: usize = 5;
pub const EMAIL_DOMAIN: &str = "@example.com";
pub const PRODUCT_PREFIX: &str = "Product_";
pub const PRODUCT_NUMBERS: RangeInclusive<u8> = 1..=50;
pub const QUANTITIES: RangeInclusive<i32> = 1..=10;

const ASCII_LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Samples a `char` uniformly from `[A-Za-z]`.
#[derive(Debug, Clone, Copy)]
pub struct AsciiLetter;

impl Distribution<char> for AsciiLetter {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> char {
        char::from(ASCII_LETTERS[rng.gen_range(0..ASCII_LETTERS.len())])
    }
}

/// Identifier assigned by storage to a row in `users`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UserId(pub i32);

/// Identifier assigned by storage to a row in `orders`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OrderId(pub i32);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A user that has not been written yet. The email is always derived from the name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    name: String,
    email: String,
}

/// Product and quantity of an order whose user is not known yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    pub product_name: String,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub user_id: UserId,
    pub product_name: String,
    pub quantity: i32,
}

#[must_use]
pub fn email_for(name: &str) -> String {
    format!("{}{}", name.to_lowercase(), EMAIL_DOMAIN)
}

impl NewUser {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let email = email_for(&name);
        NewUser { name, email }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }
}

impl OrderDraft {
    /// Ties the draft to a user that storage has already assigned an id to.
    #[must_use]
    pub fn for_user(self, user_id: UserId) -> NewOrder {
        NewOrder {
            user_id,
            product_name: self.product_name,
            quantity: self.quantity,
        }
    }
}

impl Distribution<NewUser> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> NewUser {
        let mut name = String::with_capacity(NAME_PREFIX.len() + NAME_SUFFIX_LEN);
        name.push_str(NAME_PREFIX);
        name.extend((0..NAME_SUFFIX_LEN).map(|_| rng.sample(AsciiLetter)));
        NewUser::new(name)
    }
}

impl Distribution<OrderDraft> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> OrderDraft {
        OrderDraft {
            product_name: format!("{}{}", PRODUCT_PREFIX, rng.gen_range(PRODUCT_NUMBERS)),
            quantity: rng.gen_range(QUANTITIES),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_email_derived_from_name() {
        let user = NewUser::new("User_AbCdE");
        assert_eq!(user.name(), "User_AbCdE");
        assert_eq!(user.email(), "user_abcde@example.com");
    }

    #[test]
    fn test_generated_user() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1_000 {
            let user: NewUser = rng.gen();
            let suffix = user.name().strip_prefix(NAME_PREFIX).unwrap();
            assert_eq!(suffix.len(), NAME_SUFFIX_LEN);
            assert!(suffix.chars().all(|c| c.is_ascii_alphabetic()));
            assert_eq!(user.email(), email_for(user.name()));
        }
    }

    #[test]
    fn test_letters_cover_both_cases() {
        let mut rng = StdRng::seed_from_u64(11);
        let letters: Vec<char> = (0..2_000).map(|_| rng.sample(AsciiLetter)).collect();
        assert!(letters.iter().any(char::is_ascii_uppercase));
        assert!(letters.iter().any(char::is_ascii_lowercase));
        assert!(letters.iter().all(char::is_ascii_alphabetic));
    }

    #[test]
    fn test_generated_order_draft() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen_min = false;
        let mut seen_max = false;
        for _ in 0..5_000 {
            let draft: OrderDraft = rng.gen();
            let number: u8 = draft
                .product_name
                .strip_prefix(PRODUCT_PREFIX)
                .unwrap()
                .parse()
                .unwrap();
            assert!(PRODUCT_NUMBERS.contains(&number));
            assert!(QUANTITIES.contains(&draft.quantity));
            seen_min |= draft.quantity == 1;
            seen_max |= draft.quantity == 10;
        }
        assert!(seen_min && seen_max);
    }

    #[test]
    fn test_draft_for_user() {
        let draft = OrderDraft {
            product_name: "Product_3".to_string(),
            quantity: 4,
        };
        let order = draft.for_user(UserId(17));
        assert_eq!(
            order,
            NewOrder {
                user_id: UserId(17),
                product_name: "Product_3".to_string(),
                quantity: 4,
            }
        );
    }
}

use std::sync::OnceLock;

use regex::Regex;

/// Digit groups joined by single spaces or dashes.
static DIGIT_RUN: OnceLock<Regex> = OnceLock::new();

fn digit_run() -> &'static Regex {
    DIGIT_RUN.get_or_init(|| Regex::new(r"\d+(?:[ -]\d+)*").expect("digit run pattern is valid"))
}

const CARD_LENGTHS: std::ops::RangeInclusive<usize> = 13..=19;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardrailDecision {
    Allow,
    Deny { reason_code: &'static str, user_message: String, fallback_path: &'static str },
    Degrade { reason_code: &'static str, user_message: String, fallback_path: &'static str },
}

impl GuardrailDecision {
    pub fn reason_code(&self) -> Option<&'static str> {
        match self {
            Self::Allow => None,
            Self::Deny { reason_code, .. } | Self::Degrade { reason_code, .. } => Some(*reason_code),
        }
    }

    pub fn user_message(&self) -> Option<&str> {
        match self {
            Self::Allow => None,
            Self::Deny { user_message, .. } | Self::Degrade { user_message, .. } => {
                Some(user_message.as_str())
            }
        }
    }
}

/// Checks cart requests before any model sees them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GuardrailPolicy {
    pub block_raw_card_numbers: bool,
}

impl Default for GuardrailPolicy {
    fn default() -> Self {
        Self { block_raw_card_numbers: true }
    }
}

impl GuardrailPolicy {
    pub fn evaluate_cart_query(&self, query: &str) -> GuardrailDecision {
        if query.trim().is_empty() {
            return GuardrailDecision::Degrade {
                reason_code: "empty_cart_request",
                user_message: "I didn't catch a cart request. You can ask me to view your cart, \
                               add or remove items, or check out."
                    .to_string(),
                fallback_path: "request_explicit_cart_action",
            };
        }

        if self.block_raw_card_numbers && contains_card_number(query) {
            return GuardrailDecision::Deny {
                reason_code: "raw_card_number_in_chat",
                user_message: "For your security I can't accept card numbers in chat. \
                               Please add your card through the secure card entry form instead."
                    .to_string(),
                fallback_path: "secure_card_entry",
            };
        }

        GuardrailDecision::Allow
    }
}

/// True when any span of consecutive digit groups reads as a 13 to 19 digit
/// Luhn-valid number. Neighbouring groups such as a CVV are checked apart.
pub fn contains_card_number(text: &str) -> bool {
    digit_run().find_iter(text).any(|run| {
        let groups = run
            .as_str()
            .split([' ', '-'])
            .map(|group| group.chars().filter_map(|ch| ch.to_digit(10)).collect::<Vec<_>>())
            .collect::<Vec<_>>();
        (0..groups.len()).any(|start| {
            let mut digits = Vec::new();
            groups[start..].iter().any(|group| {
                digits.extend_from_slice(group);
                CARD_LENGTHS.contains(&digits.len()) && luhn_valid(&digits)
            })
        })
    })
}

fn luhn_valid(digits: &[u32]) -> bool {
    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(index, &digit)| {
            if index % 2 == 1 {
                let doubled = digit * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                digit
            }
        })
        .sum();
    sum % 10 == 0
}

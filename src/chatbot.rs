//! Scripted complaint-intake dialogue as a finite-state machine
//!
//! The dialogue is a pure function of `(state, draft, input)`. Callers keep the
//! state and draft between turns (the HTTP endpoint round-trips them through
//! the client), and act on the returned [`Effect`].
//!
//! Flow:
//! `greeting -> ask_name -> ask_email -> ask_phone -> ask_pnr -> ask_train ->
//!  ask_category -> ask_description -> confirm -> completed`
//!
//! `cancel` ends the dialogue from any state; `restart` starts over.

use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use crate::display::{to_canonical, to_display};
use crate::model::{Category, CreateComplaintRequest, Journey};

const MAX_NAME_CHARS: usize = 120;
const MIN_DESCRIPTION_CHARS: usize = 10;
const MAX_DESCRIPTION_CHARS: usize = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ChatState {
    #[default]
    Greeting,
    AskName,
    AskEmail,
    AskPhone,
    AskPnr,
    AskTrain,
    AskCategory,
    AskDescription,
    Confirm,
    Completed,
    Cancelled,
}

/// Answers collected so far.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChatDraft {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub pnr: Option<String>,
    pub train_number: Option<String>,
    pub train_name: Option<String>,
    pub category: Option<Category>,
    pub description: Option<String>,
}

impl ChatDraft {
    /// Turns a confirmed draft into a submission request.
    pub fn into_request(self) -> CreateComplaintRequest {
        CreateComplaintRequest {
            name: self.name.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            phone: self.phone,
            title: None,
            description: self.description.unwrap_or_default(),
            category: self.category,
            priority: None,
            journey: Journey {
                train_number: self.train_number,
                train_name: self.train_name,
                pnr: self.pnr,
                ..Default::default()
            },
            media: Vec::new(),
        }
    }

    fn summary(&self) -> String {
        let field = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());
        let train = match (&self.train_number, &self.train_name) {
            (Some(number), Some(name)) => format!("{number} {name}"),
            (Some(number), None) => number.clone(),
            _ => "-".to_string(),
        };
        format!(
            "Name: {}\nEmail: {}\nPhone: {}\nPNR: {}\nTrain: {}\nCategory: {}\nDescription: {}",
            field(&self.name),
            field(&self.email),
            field(&self.phone),
            field(&self.pnr),
            train,
            self.category
                .as_ref()
                .map(|c| to_display(c.as_str()))
                .unwrap_or_else(|| "-".to_string()),
            field(&self.description),
        )
    }
}

/// What the caller should do after a step.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Show this message to the passenger.
    Reply(String),
    /// Submit the confirmed draft as a complaint.
    Submit(ChatDraft),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: ChatState,
    pub draft: ChatDraft,
    pub effect: Effect,
}

impl Transition {
    fn reply(state: ChatState, draft: ChatDraft, message: impl Into<String>) -> Self {
        Transition {
            state,
            draft,
            effect: Effect::Reply(message.into()),
        }
    }

    /// Stay in `state` and ask again.
    fn reprompt(state: ChatState, draft: ChatDraft, problem: &str) -> Self {
        Transition::reply(state, draft, format!("{problem} {}", prompt(state)))
    }
}

/// The question asked on entering `state`.
pub fn prompt(state: ChatState) -> String {
    match state {
        ChatState::Greeting => {
            "Welcome to RailMadad complaint assistance. Type anything to begin.".to_string()
        }
        ChatState::AskName => "May I have your full name?".to_string(),
        ChatState::AskEmail => "Please share your email address.".to_string(),
        ChatState::AskPhone => "Your mobile number? (or type 'skip')".to_string(),
        ChatState::AskPnr => "Your 10-digit PNR number? (or type 'skip')".to_string(),
        ChatState::AskTrain => {
            "Train number and name, e.g. '12951 Rajdhani Express'? (or type 'skip')".to_string()
        }
        ChatState::AskCategory => {
            let options: Vec<String> = Category::KNOWN
                .iter()
                .enumerate()
                .map(|(i, c)| format!("{}. {}", i + 1, to_display(c.as_str())))
                .collect();
            format!("Which category fits best?\n{}", options.join("\n"))
        }
        ChatState::AskDescription => "Please describe the problem.".to_string(),
        ChatState::Confirm => "Shall I submit this complaint? (yes/no)".to_string(),
        ChatState::Completed => {
            "Your complaint has been submitted. Type 'restart' to file another.".to_string()
        }
        ChatState::Cancelled => {
            "The conversation was cancelled. Type 'restart' to begin again.".to_string()
        }
    }
}

fn is_skip(input: &str) -> bool {
    input.eq_ignore_ascii_case("skip")
}

fn digits(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).collect()
}

fn parse_category(input: &str) -> Option<Category> {
    if let Ok(index) = input.parse::<usize>() {
        return index
            .checked_sub(1)
            .and_then(|i| Category::KNOWN.get(i))
            .cloned();
    }
    Some(Category::from(to_canonical(input))).filter(Category::is_known)
}

/// Advances the dialogue by one passenger message.
pub fn step(state: ChatState, draft: ChatDraft, input: &str) -> Transition {
    let input = input.trim();

    if input.eq_ignore_ascii_case("cancel") {
        return Transition::reply(ChatState::Cancelled, draft, prompt(ChatState::Cancelled));
    }
    if input.eq_ignore_ascii_case("restart") {
        return Transition::reply(ChatState::AskName, ChatDraft::default(), prompt(ChatState::AskName));
    }

    let mut draft = draft;
    match state {
        ChatState::Greeting => Transition::reply(ChatState::AskName, draft, prompt(ChatState::AskName)),

        ChatState::AskName => {
            if input.is_empty() {
                return Transition::reprompt(state, draft, "I didn't catch that.");
            }
            if input.chars().count() > MAX_NAME_CHARS {
                return Transition::reprompt(state, draft, "That name is too long.");
            }
            draft.name = Some(input.to_string());
            Transition::reply(
                ChatState::AskEmail,
                draft,
                format!("Thank you, {input}. {}", prompt(ChatState::AskEmail)),
            )
        }

        ChatState::AskEmail => {
            if !input.validate_email() {
                return Transition::reprompt(state, draft, "That doesn't look like an email address.");
            }
            draft.email = Some(input.to_lowercase());
            Transition::reply(ChatState::AskPhone, draft, prompt(ChatState::AskPhone))
        }

        ChatState::AskPhone => {
            if !is_skip(input) {
                let number = digits(input);
                if !(10..=13).contains(&number.len()) {
                    return Transition::reprompt(state, draft, "Please enter a valid mobile number.");
                }
                draft.phone = Some(number);
            }
            Transition::reply(ChatState::AskPnr, draft, prompt(ChatState::AskPnr))
        }

        ChatState::AskPnr => {
            if !is_skip(input) {
                let pnr = digits(input);
                if pnr.len() != 10 || pnr.len() != input.chars().filter(|c| !c.is_whitespace()).count() {
                    return Transition::reprompt(state, draft, "A PNR has exactly 10 digits.");
                }
                draft.pnr = Some(pnr);
            }
            Transition::reply(ChatState::AskTrain, draft, prompt(ChatState::AskTrain))
        }

        ChatState::AskTrain => {
            if !is_skip(input) {
                let (number, name) = match input.split_once(char::is_whitespace) {
                    Some((number, name)) => (number, Some(name.trim())),
                    None => (input, None),
                };
                if number.len() != 5 || !number.chars().all(|c| c.is_ascii_digit()) {
                    return Transition::reprompt(state, draft, "Train numbers have 5 digits.");
                }
                draft.train_number = Some(number.to_string());
                draft.train_name = name.filter(|n| !n.is_empty()).map(String::from);
            }
            Transition::reply(ChatState::AskCategory, draft, prompt(ChatState::AskCategory))
        }

        ChatState::AskCategory => match parse_category(input) {
            Some(category) => {
                draft.category = Some(category);
                Transition::reply(ChatState::AskDescription, draft, prompt(ChatState::AskDescription))
            }
            None => Transition::reprompt(state, draft, "Please pick one of the listed categories."),
        },

        ChatState::AskDescription => {
            if input.chars().count() < MIN_DESCRIPTION_CHARS {
                return Transition::reprompt(state, draft, "Could you add a little more detail?");
            }
            if input.chars().count() > MAX_DESCRIPTION_CHARS {
                return Transition::reprompt(state, draft, "That is too long for one complaint.");
            }
            draft.description = Some(input.to_string());
            let message = format!("{}\n\n{}", draft.summary(), prompt(ChatState::Confirm));
            Transition::reply(ChatState::Confirm, draft, message)
        }

        ChatState::Confirm => match input.to_lowercase().as_str() {
            "yes" | "y" | "confirm" | "submit" => Transition {
                state: ChatState::Completed,
                effect: Effect::Submit(draft.clone()),
                draft,
            },
            "no" | "n" => Transition::reply(
                ChatState::AskName,
                ChatDraft::default(),
                format!("No problem, let's start over. {}", prompt(ChatState::AskName)),
            ),
            _ => Transition::reprompt(state, draft, "Please answer yes or no."),
        },

        ChatState::Completed | ChatState::Cancelled => Transition::reply(state, draft, prompt(state)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(inputs: &[&str]) -> (Transition, Vec<Effect>) {
        let mut state = ChatState::Greeting;
        let mut draft = ChatDraft::default();
        let mut effects = Vec::new();
        let mut last = None;
        for input in inputs {
            let transition = step(state, draft, input);
            state = transition.state;
            draft = transition.draft.clone();
            effects.push(transition.effect.clone());
            last = Some(transition);
        }
        (last.expect("at least one input"), effects)
    }

    const HAPPY_PATH: [&str; 9] = [
        "hi",
        "Asha Rao",
        "Asha@Example.com",
        "98765 43210",
        "4521789630",
        "12951 Mumbai Rajdhani",
        "2",
        "AC is not cooling in coach B4",
        "yes",
    ];

    #[test]
    fn happy_path_submits_the_draft() {
        let (last, _) = run(&HAPPY_PATH);

        assert_eq!(last.state, ChatState::Completed);
        let Effect::Submit(draft) = last.effect else {
            panic!("expected a submit effect");
        };
        assert_eq!(draft.name.as_deref(), Some("Asha Rao"));
        assert_eq!(draft.email.as_deref(), Some("asha@example.com"));
        assert_eq!(draft.phone.as_deref(), Some("9876543210"));
        assert_eq!(draft.pnr.as_deref(), Some("4521789630"));
        assert_eq!(draft.train_number.as_deref(), Some("12951"));
        assert_eq!(draft.train_name.as_deref(), Some("Mumbai Rajdhani"));
        assert_eq!(draft.category, Some(Category::Hvac));
    }

    #[test]
    fn optional_steps_can_be_skipped() {
        let (last, _) = run(&["hi", "Ravi", "ravi@example.com", "skip", "skip", "skip"]);
        assert_eq!(last.state, ChatState::AskCategory);
        assert_eq!(last.draft.phone, None);
        assert_eq!(last.draft.pnr, None);
        assert_eq!(last.draft.train_number, None);
    }

    #[test]
    fn invalid_email_reprompts() {
        let (last, _) = run(&["hi", "Ravi", "ravi-at-example"]);
        assert_eq!(last.state, ChatState::AskEmail);
        assert!(matches!(last.effect, Effect::Reply(msg) if msg.contains("email")));
    }

    #[test]
    fn email_rejected_by_validator_reprompts() {
        let (last, effects) = run(&["hi", "Ravi", "ravi@x_y.com"]);
        assert_eq!(last.state, ChatState::AskEmail);
        assert_eq!(last.draft.email, None);
        assert!(!effects.iter().any(|e| matches!(e, Effect::Submit(_))));
    }

    #[test]
    fn overlong_name_reprompts() {
        let name = "A".repeat(121);
        let (last, _) = run(&["hi", &name]);
        assert_eq!(last.state, ChatState::AskName);
        assert_eq!(last.draft.name, None);

        let name = "A".repeat(120);
        let (last, _) = run(&["hi", &name]);
        assert_eq!(last.state, ChatState::AskEmail);
    }

    #[test]
    fn overlong_description_reprompts() {
        let t = step(ChatState::AskDescription, ChatDraft::default(), &"x".repeat(5001));
        assert_eq!(t.state, ChatState::AskDescription);
        assert_eq!(t.draft.description, None);

        let t = step(ChatState::AskDescription, ChatDraft::default(), &"x".repeat(5000));
        assert_eq!(t.state, ChatState::Confirm);
    }

    #[test]
    fn category_accepts_labels() {
        let t = step(ChatState::AskCategory, ChatDraft::default(), "staff conduct");
        assert_eq!(t.state, ChatState::AskDescription);
        assert_eq!(t.draft.category, Some(Category::StaffConduct));

        let t = step(ChatState::AskCategory, ChatDraft::default(), "9");
        assert_eq!(t.state, ChatState::AskCategory);
    }

    #[test]
    fn bad_pnr_reprompts() {
        let t = step(ChatState::AskPnr, ChatDraft::default(), "45217ABC30");
        assert_eq!(t.state, ChatState::AskPnr);
    }

    #[test]
    fn declining_confirmation_starts_over() {
        let mut inputs = HAPPY_PATH.to_vec();
        *inputs.last_mut().unwrap() = "no";
        let (last, _) = run(&inputs);
        assert_eq!(last.state, ChatState::AskName);
        assert_eq!(last.draft, ChatDraft::default());
    }

    #[test]
    fn cancel_works_from_any_state() {
        let t = step(ChatState::AskDescription, ChatDraft::default(), "Cancel");
        assert_eq!(t.state, ChatState::Cancelled);
    }

    #[test]
    fn only_confirmation_submits() {
        let (_, effects) = run(&HAPPY_PATH);
        let submits = effects
            .iter()
            .filter(|e| matches!(e, Effect::Submit(_)))
            .count();
        assert_eq!(submits, 1);
        assert!(matches!(effects.last(), Some(Effect::Submit(_))));
    }

    #[test]
    fn confirmed_draft_becomes_valid_request() {
        let (last, _) = run(&HAPPY_PATH);
        let Effect::Submit(draft) = last.effect else {
            panic!("expected a submit effect");
        };
        let request = draft.into_request();
        let input = crate::model::NewComplaint::try_from(request).unwrap();
        assert_eq!(input.journey.pnr.as_deref(), Some("4521789630"));
        assert_eq!(input.category, Some(Category::Hvac));
    }
}

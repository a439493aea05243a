use std::ops::RangeInclusive;

use crate::Instrument;
use crate::scoring::Question;

/// M-CHAT-R: Modified Checklist for Autism in Toddlers, Revised.
/// 20 caregiver-reported yes/no items for children 16–30 months.
/// Items 2, 5 and 12 fail on "Yes"; every other item fails on "No".
/// 0-2: low risk, 3-7: medium risk, 8-20: high risk.
pub struct MChatR;

impl Instrument for MChatR {
    fn id(&self) -> &str {
        "mchat_r"
    }

    fn name(&self) -> &str {
        "M-CHAT-R"
    }

    fn age_range_months(&self) -> RangeInclusive<u32> {
        16..=30
    }

    fn questions(&self) -> &[Question] {
        &QUESTIONS
    }

    fn instructions(&self) -> &str {
        "Please answer these questions about your child. Keep in mind how your child usually \
         behaves. If you have seen your child do the behavior a few times, but he or she does \
         not usually do it, then please answer no. Please answer yes or no for every question. \
         Thank you very much."
    }
}

const fn item(id: u8, text: &'static str, example: Option<&'static str>) -> Question {
    Question {
        id,
        text,
        example,
        is_special: false,
    }
}

const fn special(id: u8, text: &'static str, example: Option<&'static str>) -> Question {
    Question {
        id,
        text,
        example,
        is_special: true,
    }
}

static QUESTIONS: [Question; mchat_core::QUESTION_COUNT] = [
    item(
        1,
        "If you point at something across the room, does your child look at it?",
        Some("For example, if you point at a toy or an animal, does your child look at the toy or animal?"),
    ),
    special(2, "Have you ever wondered if your child might be deaf?", None),
    item(
        3,
        "Does your child play pretend or make-believe?",
        Some("For example, pretend to drink from an empty cup, pretend to talk on a phone, or pretend to feed a doll or stuffed animal?"),
    ),
    item(
        4,
        "Does your child like climbing on things?",
        Some("For example, furniture, playground equipment, or stairs"),
    ),
    special(
        5,
        "Does your child make unusual finger movements near his or her eyes?",
        Some("For example, does your child wiggle his or her fingers close to his or her eyes?"),
    ),
    item(
        6,
        "Does your child point with one finger to ask for something or to get help?",
        Some("For example, pointing to a snack or toy that is out of reach"),
    ),
    item(
        7,
        "Does your child point with one finger to show you something interesting?",
        Some("For example, pointing to an airplane in the sky or a big truck in the road"),
    ),
    item(
        8,
        "Is your child interested in other children?",
        Some("For example, does your child watch other children, smile at them, or go to them?"),
    ),
    item(
        9,
        "Does your child show you things by bringing them to you or holding them up for you to see, not to get help, but just to share?",
        Some("For example, showing you a flower, a stuffed animal, or a toy truck"),
    ),
    item(
        10,
        "Does your child respond when you call his or her name?",
        Some("For example, does he or she look up, talk or babble, or stop what he or she is doing when you call his or her name?"),
    ),
    item(11, "When you smile at your child, does he or she smile back at you?", None),
    special(
        12,
        "Does your child get upset by everyday noises?",
        Some("For example, does your child scream or cry to noise such as a vacuum cleaner or loud music?"),
    ),
    item(13, "Does your child walk?", None),
    item(
        14,
        "Does your child look you in the eye when you are talking to him or her, playing with him or her, or dressing him or her?",
        None,
    ),
    item(
        15,
        "Does your child try to copy what you do?",
        Some("For example, wave bye-bye, clap, or make a funny noise when you do"),
    ),
    item(
        16,
        "If you turn your head to look at something, does your child look around to see what you are looking at?",
        None,
    ),
    item(
        17,
        "Does your child try to get you to watch him or her?",
        Some("For example, does your child look at you for praise, or say \"look\" or \"watch me\"?"),
    ),
    item(
        18,
        "Does your child understand when you tell him or her to do something?",
        Some("For example, if you don't point, can your child understand \"put the book on the chair\" or \"bring me the blanket\"?"),
    ),
    item(
        19,
        "If something new happens, does your child look at your face to see how you feel about it?",
        Some("For example, if he or she hears a strange or funny noise, or sees a new toy, will he or she look at your face?"),
    ),
    item(
        20,
        "Does your child like movement activities?",
        Some("For example, being swung or bounced on your knee"),
    ),
];

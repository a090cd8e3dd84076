use crate::db::Faq;

/// First entry, in slice order, whose question contains the message or is
/// contained by it, ignoring case.
///
/// This is a plain substring test in both directions, so short questions
/// match generously ("hi" hits anything containing "hi").
pub fn find_match<'a>(message: &str, faqs: &'a [Faq]) -> Option<&'a Faq> {
    let message = message.to_lowercase();
    faqs.iter().find(|faq| {
        let question = faq.question.to_lowercase();
        message.contains(&question) || question.contains(&message)
    })
}

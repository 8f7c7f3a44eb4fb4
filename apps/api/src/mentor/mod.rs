// Career-mentor chat. Stateless: the client sends the transcript with each turn.

pub mod chat;
pub mod handlers;

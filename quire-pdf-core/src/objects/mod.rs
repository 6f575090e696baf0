mod arena;
mod dictionary;
mod primitive;
mod stream;

pub use arena::ObjectArena;
pub use dictionary::Dictionary;
pub use primitive::{Object, ObjectId};
pub use stream::Stream;

/// Room command queue configuration.
///
/// Capacity of the subscribe/unsubscribe channel. Submissions beyond it are
/// acknowledged as failed instead of blocking the socket.
pub const COMMAND_QUEUE_CAPACITY: usize = 1024;

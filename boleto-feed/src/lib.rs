pub mod feed;
pub mod live;
pub mod push;
pub mod stomp;
pub mod ticket;

pub use feed::{FeedError, TicketFeed};
pub use live::{LiveError, LiveTickets};
pub use push::{PushError, PushHandle, StompPush, TicketPush};
pub use ticket::{ScanPayload, Ticket, TicketBadge};

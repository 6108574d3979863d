//! Query layer over the roster tables.

mod clan_repo;
mod member_repo;

pub use clan_repo::ClanRepo;
pub use member_repo::MemberRepo;

mod estimate;
mod percent;
mod tracked;
mod transfer_rate;

pub use estimate::Estimate;
pub use percent::Percent;
pub use tracked::Tracked;
pub use transfer_rate::TransferRate;

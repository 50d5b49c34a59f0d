mod block_template;
mod block_template_request;
mod bytes;
mod hash;
mod kernel;
mod mining_info;
mod staking_info;

pub use self::block_template::{BlockTemplate, BlockTemplateTransaction};
pub use self::block_template_request::{BlockTemplateRequest, BlockTemplateRequestMode, BlockTemplateResponse};
pub use self::bytes::Bytes;
pub use self::hash::H256;
pub use self::kernel::{CheckKernelResponse, KernelInfo, KernelInput};
pub use self::mining_info::{EstimateFeeResponse, GenerateBlockResponse, MiningInfo};
pub use self::staking_info::{StakingInfo, StakingStatus};

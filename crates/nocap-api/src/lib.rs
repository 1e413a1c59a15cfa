#![forbid(unsafe_code)]
//! Wire contract: error bodies, response envelopes, list parameters, and
//! request DTOs. Nothing here touches the store or the network.

mod dto;
mod error_mapping;
mod errors;
mod params;
mod responses;

pub use dto::{
    ActivityDraft, ConnectWalletRequest, ExerciseRequest, GrantDraft, LoginRequest, ScheduleDraft,
    SecurityDraft, StakeholderDraft, TransactionDraft, TransferPreviewRequest,
};
pub use error_mapping::{map_error, ApiErrorMapping};
pub use errors::{ApiError, ApiErrorCode};
pub use params::{
    parse_list_params, parse_list_params_with_limit, ListParams, SortOrder, DEFAULT_PAGE_SIZE,
    MAX_PAGE_SIZE,
};
pub use responses::{ApiResponseEnvelope, PageMetadata};

pub const CRATE_NAME: &str = "nocap-api";
pub const API_VERSION: &str = "v1";

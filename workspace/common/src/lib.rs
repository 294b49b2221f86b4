//! Transport-layer types shared between the backend and its clients.
//! Request bodies carry their `validator` rules; response DTOs mirror
//! what the HTTP handlers serialize inside the `ApiResponse` envelope.

mod auth;
mod budget;
mod goal;
mod graph;
mod profile;

pub use auth::{AuthResponse, LoginRequest, RefreshRequest, RegisterRequest, UserDto};
pub use budget::{
    BudgetDto, CreateBudgetRequest, CreateTransactionRequest, TransactionDto, UpdateBudgetRequest,
};
pub use goal::{
    CreateGoalRequest, CreateGoalTransactionRequest, GoalDto, GoalTransactionDto,
    UpdateGoalRequest,
};
pub use graph::{
    CreateFlowRequest, CreateNodeRequest, FlowDto, NodeDto, UpdateFlowRequest, UpdateNodeRequest,
};
pub use profile::{CreateProfileRequest, ProfileDto, UpdateProfileRequest};

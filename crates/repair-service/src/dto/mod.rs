//! 维修服务 DTO 模块
//!
//! 包含所有请求和响应的数据传输对象

pub mod request;
pub mod response;

pub use request::{
    ActivityLogFilter, AdminRepairQuery, AttachClubTypeRequest, CardObjectInput, CardQuery,
    ChangeStatusRequest, CourierBoardQuery, CreateCardRequest, CreateClubRequest,
    CreateEquipmentModelRequest, CreateEquipmentTypeRequest, CreateRepairRequest,
    CreateUserRequest, LoginRequest, PaginationParams, RepairListQuery, SaveLayoutRequest,
    UpdateCardRequest, UpdateDescriptionRequest, UpdatePcNumberRequest,
};

pub use response::{
    ActivityLogDto, AdminIndicatorsDto, AdminRepairListResponse, ApiResponse, CardDto,
    CardObjectDto, ClearedResponse, ClubCountDto, ClubDto, ClubOverviewDto, ClubStatsDto,
    ClubSummaryDto, CourierBoardDto, CurrentUserDto, DbStatusDto,
    DeletedResponse, EquipmentModelDto, EquipmentTypeDto, LoginResponse, PageResponse, RepairDto,
    RepairListResponse, TabCountDto, UserDto,
};

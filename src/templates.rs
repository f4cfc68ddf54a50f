pub const STATE_V1_SWIFT: &str = include_str!("../templates/state/v1.swift");
pub const STATE_V2_SWIFT: &str = include_str!("../templates/state/v2.swift");
pub const STATE_LATEST_SWIFT: &str = include_str!("../templates/state/latest.swift");
pub const APP_V1_SWIFT: &str = include_str!("../templates/app/v1.swift");
pub const APP_V2_SWIFT: &str = include_str!("../templates/app/v2.swift");
pub const APP_V3_SWIFT: &str = include_str!("../templates/app/v3.swift");
pub const APP_LATEST_SWIFT: &str = include_str!("../templates/app/latest.swift");
pub const ROUTES_SWIFT: &str = include_str!("../templates/scaffold/routes.swift");
pub const MODEL_SWIFT: &str = include_str!("../templates/scaffold/model.swift");
pub const OPERATION_SWIFT: &str = include_str!("../templates/scaffold/operation.swift");

//! Permission Definitions
//!
//! ## 设计原则
//! - 查看类操作 (菜单、订单、桌台) 登录即可
//! - 按功能模块授权写操作
//! - 退款单独授权
//! - 用户与角色管理仅 admin (is_system 保护)

/// 可配置权限列表
pub const ALL_PERMISSIONS: &[&str] = &[
    // === 模块化权限 ===
    "menu:manage",         // 分类/菜品 增删改
    "tables:manage",       // 桌台 增删改、生成二维码
    "sessions:manage",     // 修改/关闭桌台会话
    "orders:manage",       // 下单、加菜、订单状态
    "kitchen:manage",      // 菜品制作状态
    "payments:manage",     // 创建/确认/失败支付
    "reservations:manage", // 预订管理
    "customers:manage",    // 顾客资料
    // === 敏感操作 ===
    "payments:refund", // 退款
];

/// Admin 专属权限 (不在可配置列表中)
pub const ADMIN_ONLY_PERMISSIONS: &[&str] = &[
    "users:manage", // 员工与角色管理
    "all",          // 超级权限
];

pub const DEFAULT_ADMIN_PERMISSIONS: &[&str] = &["all"];

/// 经理: 全部可配置权限
pub const DEFAULT_MANAGER_PERMISSIONS: &[&str] = ALL_PERMISSIONS;

pub const DEFAULT_CASHIER_PERMISSIONS: &[&str] = &[
    "sessions:manage",
    "orders:manage",
    "payments:manage",
    "customers:manage",
];

pub const DEFAULT_WAITER_PERMISSIONS: &[&str] = &[
    "sessions:manage",
    "orders:manage",
    "kitchen:manage",
    "reservations:manage",
    "customers:manage",
];

pub const DEFAULT_KITCHEN_PERMISSIONS: &[&str] = &["kitchen:manage"];

/// 系统预置角色 (名称, 描述, 权限)
pub const SYSTEM_ROLES: &[(&str, &str, &[&str])] = &[
    ("admin", "Administrator", DEFAULT_ADMIN_PERMISSIONS),
    ("manager", "Restaurant manager", DEFAULT_MANAGER_PERMISSIONS),
    ("cashier", "Cashier", DEFAULT_CASHIER_PERMISSIONS),
    ("waiter", "Waiter", DEFAULT_WAITER_PERMISSIONS),
    ("kitchen", "Kitchen staff", DEFAULT_KITCHEN_PERMISSIONS),
];

/// Get permissions for a role name
pub fn get_default_permissions(role_name: &str) -> Vec<String> {
    SYSTEM_ROLES
        .iter()
        .find(|(name, _, _)| *name == role_name)
        .map(|(_, _, perms)| perms.iter().map(|s| s.to_string()).collect())
        .unwrap_or_default()
}

/// Validate if a permission string is valid
///
/// `"<module>:*"` is accepted when some known permission lives in that module.
pub fn is_valid_permission(permission: &str) -> bool {
    if ALL_PERMISSIONS.contains(&permission) || ADMIN_ONLY_PERMISSIONS.contains(&permission) {
        return true;
    }
    match permission.strip_suffix(":*") {
        Some(module) => ALL_PERMISSIONS
            .iter()
            .chain(ADMIN_ONLY_PERMISSIONS)
            .any(|p| p.split(':').next() == Some(module)),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_permission() {
        assert!(is_valid_permission("orders:manage"));
        assert!(is_valid_permission("all"));
        assert!(is_valid_permission("payments:*"));
        assert!(!is_valid_permission("unknown:*"));
        assert!(!is_valid_permission("orders:fly"));
    }

    #[test]
    fn test_default_permissions() {
        assert_eq!(get_default_permissions("admin"), vec!["all".to_string()]);
        assert!(get_default_permissions("kitchen").contains(&"kitchen:manage".to_string()));
        assert!(get_default_permissions("nobody").is_empty());
        for (_, _, perms) in SYSTEM_ROLES {
            assert!(perms.iter().all(|p| is_valid_permission(p)));
        }
    }
}

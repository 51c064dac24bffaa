#![allow(dead_code)]

use std::path::Path;

/// The `shop` fixture project, keyed by registry path.
pub const SHOP: &[(&str, &str)] = &[
    ("shop/openapi.yaml", include_str!("../fixtures/shop/openapi.yaml")),
    ("shop/paths/users.yaml", include_str!("../fixtures/shop/paths/users.yaml")),
    ("shop/paths/users_id.yaml", include_str!("../fixtures/shop/paths/users_id.yaml")),
    (
        "shop/paths/users_post_read.md",
        include_str!("../fixtures/shop/paths/users_post_read.md"),
    ),
    ("shop/paths/orders/get.yaml", include_str!("../fixtures/shop/paths/orders/get.yaml")),
    ("shop/schemas/CreateUser.yaml", include_str!("../fixtures/shop/schemas/CreateUser.yaml")),
    ("shop/schemas/User.yaml", include_str!("../fixtures/shop/schemas/User.yaml")),
    ("shop/schemas/Address.yaml", include_str!("../fixtures/shop/schemas/Address.yaml")),
    ("shop/schemas/UserPage.yaml", include_str!("../fixtures/shop/schemas/UserPage.yaml")),
    ("shop/common/Error.yaml", include_str!("../fixtures/shop/common/Error.yaml")),
    ("shop/common/Limit.yaml", include_str!("../fixtures/shop/common/Limit.yaml")),
];

/// Write the fixture project below `base`.
pub fn write_shop(base: &Path) {
    for (path, content) in SHOP {
        let target = base.join(path);
        std::fs::create_dir_all(target.parent().expect("fixture paths have a parent"))
            .expect("should create fixture directory");
        std::fs::write(&target, content).expect("should write fixture file");
    }
}

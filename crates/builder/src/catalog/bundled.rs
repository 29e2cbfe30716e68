//! Pipeline definitions compiled into the binary
//!
//! Names mirror the file layout under `pipelines/` without the `.yaml`
//! extension, so `autoconf/make` is `pipelines/autoconf/make.yaml`.

pub(crate) const BUNDLED: &[(&str, &str)] = &[
    ("fetch", include_str!("../../pipelines/fetch.yaml")),
    ("git-checkout", include_str!("../../pipelines/git-checkout.yaml")),
    ("strip", include_str!("../../pipelines/strip.yaml")),
    (
        "autoconf/configure",
        include_str!("../../pipelines/autoconf/configure.yaml"),
    ),
    ("autoconf/make", include_str!("../../pipelines/autoconf/make.yaml")),
    (
        "autoconf/make-install",
        include_str!("../../pipelines/autoconf/make-install.yaml"),
    ),
    (
        "cmake/configure",
        include_str!("../../pipelines/cmake/configure.yaml"),
    ),
    ("cmake/build", include_str!("../../pipelines/cmake/build.yaml")),
    ("cmake/install", include_str!("../../pipelines/cmake/install.yaml")),
];

//! APKBUILD generation
//!
//! The packaging stage runs `abuild` against a generated APKBUILD whose
//! `package()` copies the already-built tree from the read-only input mount.
//! Nothing is fetched or compiled by abuild itself.

use apkforge_config::fixed_paths;
use apkforge_types::Spec;

/// File name abuild expects in its working directory
pub const APKBUILD: &str = "APKBUILD";

/// Render the APKBUILD for `spec`
#[must_use]
pub fn render_apkbuild(spec: &Spec) -> String {
    let pkgname = spec.name.to_lowercase();
    let depends = spec.dependencies.runtime.join(" ");
    let input = fixed_paths::INPUT_DIR;
    let output = fixed_paths::OUTPUT_DIR;

    format!(
        r#"# Contributor: apkforge
pkgname="{pkgname}"
pkgver="{pkgver}"
pkgrel="{pkgrel}"
pkgdesc="{pkgdesc}"
url="{url}"
arch="all"
license="{license}"
depends="{depends}"
options="!check !strip"
source=""

build() {{
	true
}}

package() {{
	mkdir -p "$pkgdir"
	cp -a {input}{output}/* "$pkgdir"/ 2>/dev/null || cp -a {input}/* "$pkgdir"/
}}
"#,
        pkgver = spec.version,
        pkgrel = spec.epoch,
        pkgdesc = spec.description,
        url = spec.url,
        license = spec.license,
    )
}

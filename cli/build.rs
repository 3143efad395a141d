/*
 * SPDX-FileCopyrightText: 2026 The striperank contributors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

fn main() {
    built::write_built_file().expect("Failed to acquire build-time information");
}

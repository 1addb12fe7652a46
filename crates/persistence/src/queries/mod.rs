// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read paths for ledgers, forms and audit events.

pub mod audit;
pub mod forms;
pub mod ledgers;

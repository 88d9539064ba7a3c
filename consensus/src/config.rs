// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

/// Numerator of the super-majority fraction. A phase advances only with
/// strictly more than `NUM / DEN` of the voting power behind it.
pub const SUPER_MAJORITY_NUM: u64 = 2;
/// Denominator of the super-majority fraction.
pub const SUPER_MAJORITY_DEN: u64 = 3;

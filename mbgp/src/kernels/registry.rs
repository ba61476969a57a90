use std::collections::BTreeMap;

use once_cell::sync::Lazy;

use crate::Error;

use super::{KernelOrder, OutputMode};

type KernelEntry = (&'static [KernelOrder], OutputMode);

const TWO_BODY: &[KernelOrder] = &[KernelOrder::TwoBody];
const THREE_BODY: &[KernelOrder] = &[KernelOrder::ThreeBody];
const TWO_PLUS_THREE: &[KernelOrder] = &[KernelOrder::TwoBody, KernelOrder::ThreeBody];
const MANY_BODY: &[KernelOrder] = &[KernelOrder::ManyBody];
const MANY_BODY_TRIPLET: &[KernelOrder] = &[KernelOrder::ManyBodyTriplet];
const ALL_MANY_BODY: &[KernelOrder] = &[KernelOrder::ManyBody, KernelOrder::ManyBodyTriplet];
const ALL_ORDERS: &[KernelOrder] = &[
    KernelOrder::TwoBody,
    KernelOrder::ThreeBody,
    KernelOrder::ManyBody,
    KernelOrder::ManyBodyTriplet,
];

// Register the four output modes of a kernel, using the usual `_grad`, `_en`
// and `_force_en` suffixes unless the names are given explicitly
macro_rules! add_kernel {
    ($map :expr, $name :literal, $orders :expr) => {
        add_kernel!(
            $map, $name, concat!($name, "_grad"), concat!($name, "_force_en"), concat!($name, "_en"), $orders
        );
    };
    ($map :expr, $name :expr, $grad :expr, $force_energy :expr, $energy :expr, $orders :expr) => {
        $map.insert($name, ($orders, OutputMode::ForceForce));
        $map.insert($grad, ($orders, OutputMode::Gradient));
        $map.insert($force_energy, ($orders, OutputMode::ForceEnergy));
        $map.insert($energy, ($orders, OutputMode::EnergyEnergy));
    };
}

static REGISTERED_KERNELS: Lazy<BTreeMap<&'static str, KernelEntry>> = Lazy::new(|| {
    let mut map = BTreeMap::new();
    add_kernel!(map, "2", TWO_BODY);
    add_kernel!(map, "3", THREE_BODY);
    add_kernel!(map, "2+3", TWO_PLUS_THREE);
    add_kernel!(map, "mb", ALL_MANY_BODY);
    add_kernel!(map, "many", ALL_MANY_BODY);
    add_kernel!(map, "2+3+mb", ALL_ORDERS);
    add_kernel!(map, "2+3+many", ALL_ORDERS);

    add_kernel!(map, "two_body_mc", TWO_BODY);
    add_kernel!(map, "three_body_mc", THREE_BODY);
    add_kernel!(
        map,
        "two_plus_three_body_mc",
        "two_plus_three_body_mc_grad",
        "two_plus_three_mc_force_en",
        "two_plus_three_mc_en",
        TWO_PLUS_THREE
    );
    add_kernel!(map, "many_2body_mc", MANY_BODY);
    add_kernel!(map, "many_3body_mc", MANY_BODY_TRIPLET);
    add_kernel!(map, "two_plus_three_plus_many_body_mc", ALL_ORDERS);
    return map;
});

/// Get the orders and output mode of the kernel registered under `name`
pub fn lookup_kernel(name: &str) -> Result<KernelEntry, Error> {
    match REGISTERED_KERNELS.get(name) {
        Some(&entry) => Ok(entry),
        None => Err(Error::InvalidParameter(
            format!("unknown kernel with name '{}'", name)
        )),
    }
}

/// Get the names of all registered kernels, sorted
pub fn kernel_names() -> Vec<&'static str> {
    REGISTERED_KERNELS.keys().copied().collect()
}

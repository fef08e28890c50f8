// cap-core/src/units.rs

use uom::si::f64::{
    Capacitance as UomCapacitance, ElectricalResistance as UomElectricalResistance,
};

// Circuit element types (SI, f64)
pub type Capacitance = UomCapacitance;
pub type Resistance = UomElectricalResistance;

#[inline]
pub fn farad(v: f64) -> Capacitance {
    use uom::si::capacitance::farad;
    Capacitance::new::<farad>(v)
}

#[inline]
pub fn ohm(v: f64) -> Resistance {
    use uom::si::electrical_resistance::ohm;
    Resistance::new::<ohm>(v)
}

/// The logistic function scaled by `amp`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sigmoid {
    amp: f32,
}

impl Default for Sigmoid {
    fn default() -> Self {
        Self { amp: 1. }
    }
}

impl Sigmoid {
    pub fn new(amp: f32) -> Self {
        Self { amp }
    }

    fn logistic(z: f32) -> f32 {
        1. / (1. + (-z).exp())
    }

    pub fn f(&self, z: f32) -> f32 {
        self.amp * Self::logistic(z)
    }

    pub fn df(&self, z: f32) -> f32 {
        let s = Self::logistic(z);
        self.amp * s * (1. - s)
    }
}

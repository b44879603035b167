pub mod anchor {
    pub mod timebound;
    pub mod curvewindow;
    pub mod curveanchor;
}

pub mod configuration;

pub mod manager {
    pub mod namedobject;
    pub mod managererror;
    pub mod manager;
}

pub mod math {
    pub mod curve {
        pub mod curve;
        pub mod curveerror;
        pub mod boundarypolicy;
        pub mod curvecompatible;
        pub mod curvemanager;

        pub mod parametriccurve {
            pub mod gaussiancurve;
            pub mod quadraticcurve;
            pub mod sinecurve;
        }

        pub mod nonparametriccurve {
            pub mod nonparametriccurve;
            pub mod piecewisepolynomial;
            pub mod lagrangepolynomial;
            pub mod discretepointcurve;
            pub mod splinecurve;
        }
    }
    pub mod polyfit;
    pub mod smoothingspline;
    pub mod statistics;
}

pub mod time {
    pub mod utility;
}

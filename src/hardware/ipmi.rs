//! IPMI (ipmitool lanplus) implementation of the hardware adapter.

pub mod ipmi_adapter;

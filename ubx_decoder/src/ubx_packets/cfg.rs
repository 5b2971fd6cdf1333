//! Outbound UBX-CFG message generator.
//!
//! Commands are written as `"CFG-<NAME> arg1 arg2 ..."`. Each command has a
//! fixed payload layout; arguments are encoded in order and missing ones
//! are zero.

use num_traits::AsPrimitive;

use crate::{constants::UBX_CLASS_CFG, field, parser::encode_frame};

/// Encoding of one payload field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    U1,
    U2,
    U4,
    I1,
    I2,
    I4,
    R4,
    R8,
    /// 32 characters, space padded
    S32,
}

impl FieldKind {
    pub const fn size(self) -> usize {
        match self {
            Self::U1 | Self::I1 => 1,
            Self::U2 | Self::I2 => 2,
            Self::U4 | Self::I4 | Self::R4 => 4,
            Self::R8 => 8,
            Self::S32 => 32,
        }
    }
}

/// Configuration commands understood by [gen_ubx]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CfgCommand {
    /// `portid res0 res1 mode baudrate inmask outmask flags`
    Prt,
    /// `vendid prodid res1 res2 power flags vstr pstr serino`
    Usb,
    /// `msgid rate0 rate1 rate2 rate3`
    Msg,
    /// `filter version numsv flags`
    Nmea,
    /// `meas nav time`
    Rate,
    /// `clear_mask save_mask load_mask`
    Cfg,
    /// `interval length status time_ref res adelay rdelay udelay`
    Tp,
    Nav2,
    /// `maja flat dx dy dz rotx roty rotz scale`
    Dat,
    /// `protocolid res0 res1 mask0 mask1 mask2 mask3`
    Inf,
    /// `navbbr reset res`
    Rst,
    /// `gpsmode lpmode`
    Rxm,
    /// `flags pins`
    Ant,
    /// `flags treacq tacq treacqoff tacqoff ton toff res basetow`
    Fxn,
    /// `mode usage maxsbas res scanmode`
    Sbas,
    /// `key0 key1 key2 key3 key4 key5`
    Lic,
    /// `intid rate flags`
    Tm,
    /// `ch res0 res1 rate flags`
    Tm2,
    /// `tmode posx posy posz posvar svinmindur svinvarlimit`
    Tmode,
    Ekf,
}

use FieldKind::*;

impl CfgCommand {
    pub const ALL: [Self; 20] = [
        Self::Prt,
        Self::Usb,
        Self::Msg,
        Self::Nmea,
        Self::Rate,
        Self::Cfg,
        Self::Tp,
        Self::Nav2,
        Self::Dat,
        Self::Inf,
        Self::Rst,
        Self::Rxm,
        Self::Ant,
        Self::Fxn,
        Self::Sbas,
        Self::Lic,
        Self::Tm,
        Self::Tm2,
        Self::Tmode,
        Self::Ekf,
    ];

    /// Name without the `CFG-` prefix
    pub const fn name(self) -> &'static str {
        match self {
            Self::Prt => "PRT",
            Self::Usb => "USB",
            Self::Msg => "MSG",
            Self::Nmea => "NMEA",
            Self::Rate => "RATE",
            Self::Cfg => "CFG",
            Self::Tp => "TP",
            Self::Nav2 => "NAV2",
            Self::Dat => "DAT",
            Self::Inf => "INF",
            Self::Rst => "RST",
            Self::Rxm => "RXM",
            Self::Ant => "ANT",
            Self::Fxn => "FXN",
            Self::Sbas => "SBAS",
            Self::Lic => "LIC",
            Self::Tm => "TM",
            Self::Tm2 => "TM2",
            Self::Tmode => "TMODE",
            Self::Ekf => "EKF",
        }
    }

    pub const fn msg_id(self) -> u8 {
        match self {
            Self::Prt => 0x00,
            Self::Usb => 0x1b,
            Self::Msg => 0x01,
            Self::Nmea => 0x17,
            Self::Rate => 0x08,
            Self::Cfg => 0x09,
            Self::Tp => 0x07,
            Self::Nav2 => 0x1a,
            Self::Dat => 0x06,
            Self::Inf => 0x02,
            Self::Rst => 0x04,
            Self::Rxm => 0x11,
            Self::Ant => 0x13,
            Self::Fxn => 0x0e,
            Self::Sbas => 0x16,
            Self::Lic => 0x80,
            Self::Tm => 0x10,
            Self::Tm2 => 0x19,
            Self::Tmode => 0x1d,
            Self::Ekf => 0x12,
        }
    }

    pub const fn fields(self) -> &'static [FieldKind] {
        match self {
            Self::Prt => &[U1, U1, U2, U4, U4, U2, U2, U2, U2],
            Self::Usb => &[U2, U2, U2, U2, U2, U2, S32, S32, S32],
            Self::Msg => &[U1, U1, U1, U1, U1, U1],
            Self::Nmea => &[U1, U1, U1, U1],
            Self::Rate => &[U2, U2, U2],
            Self::Cfg => &[U4, U4, U4],
            Self::Tp => &[U4, U4, I1, U1, U2, I2, I2, I4],
            Self::Nav2 => &[
                U1, U1, U2, U1, U1, U1, U1, I4, U1, U1, U1, U1, U1, U1, U2, U2, U2, U2, U2, U1, U1,
                U2, U4, U4,
            ],
            Self::Dat => &[R8, R8, R4, R4, R4, R4, R4, R4, R4],
            Self::Inf => &[U1, U1, U2, U1, U1, U1, U1],
            Self::Rst => &[U2, U1, U1],
            Self::Rxm => &[U1, U1],
            Self::Ant => &[U2, U2],
            Self::Fxn => &[U4, U4, U4, U4, U4, U4, U4, U4],
            Self::Sbas => &[U1, U1, U1, U1, U4],
            Self::Lic => &[U2, U2, U2, U2, U2, U2],
            Self::Tm => &[U4, U4, U4],
            Self::Tm2 => &[U1, U1, U2, U4, U4],
            Self::Tmode => &[U4, I4, I4, I4, U4, U4, U4],
            Self::Ekf => &[U1, U1, U1, U1, U4, U2, U2, U1, U1, U2],
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|cmd| cmd.name() == name)
    }

    pub fn payload_len(self) -> usize {
        self.fields().iter().map(|f| f.size()).sum()
    }

    /// Encodes `args` into this command's payload layout.
    ///
    /// Missing or non-numeric arguments are zero, integers are truncated
    /// to the field width and surplus arguments are ignored.
    pub fn encode_payload<'s, I>(self, args: I) -> Vec<u8>
    where
        I: IntoIterator<Item = &'s str>,
    {
        let mut payload = vec![0u8; self.payload_len()];
        let mut args = args.into_iter();
        let mut offset = 0;
        for kind in self.fields() {
            let arg = args.next();
            match kind {
                U1 => field::set_u1(&mut payload, offset, int_arg(arg)),
                U2 => field::set_u2(&mut payload, offset, int_arg(arg)),
                U4 => field::set_u4(&mut payload, offset, int_arg(arg)),
                I1 => field::set_i1(&mut payload, offset, int_arg(arg)),
                I2 => field::set_i2(&mut payload, offset, int_arg(arg)),
                I4 => field::set_i4(&mut payload, offset, int_arg(arg)),
                R4 => field::set_r4(&mut payload, offset, float_arg(arg) as f32),
                R8 => field::set_r8(&mut payload, offset, float_arg(arg)),
                S32 => {
                    let text = arg.unwrap_or("").as_bytes();
                    let n = text.len().min(32);
                    payload[offset..offset + n].copy_from_slice(&text[..n]);
                    payload[offset + n..offset + 32].fill(b' ');
                },
            }
            offset += kind.size();
        }
        payload
    }

    /// Complete frame for this command
    pub fn encode<'s, I>(self, args: I) -> Vec<u8>
    where
        I: IntoIterator<Item = &'s str>,
    {
        encode_frame(UBX_CLASS_CFG, self.msg_id(), &self.encode_payload(args))
    }
}

/// Builds the frame for a `"CFG-<NAME> args..."` command line.
///
/// Unknown commands, or lines not starting with `CFG-`, give an empty buffer.
pub fn gen_ubx(msg: &str) -> Vec<u8> {
    let mut args = msg.split(' ').filter(|s| !s.is_empty());
    let cmd = match args
        .next()
        .and_then(|name| name.strip_prefix("CFG-"))
        .and_then(CfgCommand::from_name)
    {
        Some(cmd) => cmd,
        None => return Vec::new(),
    };
    cmd.encode(args)
}

fn int_arg<T>(arg: Option<&str>) -> T
where
    T: Copy + 'static,
    i64: AsPrimitive<T>,
{
    arg.map_or(0, leading_int).as_()
}

/// Leading decimal integer of `s`, 0 if there is none
fn leading_int(s: &str) -> i64 {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let value = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |acc, d| acc.wrapping_mul(10).wrapping_add(i64::from(d - b'0')));
    if negative {
        value.wrapping_neg()
    } else {
        value
    }
}

fn float_arg(arg: Option<&str>) -> f64 {
    arg.map_or(0.0, leading_float)
}

/// Longest prefix of `s` that parses as a float, 0 if there is none
fn leading_float(s: &str) -> f64 {
    let s = s.trim_start();
    let mut ends: Vec<usize> = s.char_indices().map(|(i, _)| i).skip(1).collect();
    ends.push(s.len());
    ends.into_iter()
        .rev()
        .find_map(|end| s[..end].parse::<f64>().ok())
        .unwrap_or(0.0)
}

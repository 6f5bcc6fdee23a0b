//! Hardware reports to output events. Every batch ends with SYN_REPORT.

use crate::driver::{Abs, Report};
use crate::mapping::{AxisMap, EventMap};
use crate::protocol::{
    AccelAxis, BalanceAxis, Calibration, IR_MISSING, IrAxis, StickAxis,
};
use evdev::{EventType, InputEvent, Synchronization};

fn key(code: u16, value: i32) -> InputEvent {
    InputEvent::new(EventType::KEY, code, value)
}

fn axis(events: &mut Vec<InputEvent>, map: AxisMap, raw: i32) {
    events.push(InputEvent::new(
        EventType::ABSOLUTE,
        map.code.raw(),
        raw.wrapping_mul(map.scale),
    ));
}

fn sync() -> InputEvent {
    InputEvent::new(EventType::SYNCHRONIZATION, Synchronization::SYN_REPORT.0, 0)
}

/// Watch reports are not translated; they yield an empty batch.
pub fn translate(report: &Report, map: &EventMap, cal: &Calibration) -> Vec<InputEvent> {
    let mut events = Vec::with_capacity(8);
    match report {
        Report::Key { key: button, state } => {
            events.push(key(map.button(*button).raw(), *state));
        }
        Report::NunchukMove { stick, accel } => {
            axis(&mut events, map.stick[StickAxis::NunchukX as usize], stick.x);
            axis(&mut events, map.stick[StickAxis::NunchukY as usize], stick.y);
            if map.accel_active {
                axis(&mut events, map.accel[AccelAxis::NunchukX as usize], accel.x);
                axis(&mut events, map.accel[AccelAxis::NunchukY as usize], accel.y);
                axis(&mut events, map.accel[AccelAxis::NunchukZ as usize], accel.z);
            }
        }
        // Analog triggers are never translated.
        Report::ClassicMove { left, right, .. } => {
            axis(&mut events, map.stick[StickAxis::LeftX as usize], left.x);
            axis(&mut events, map.stick[StickAxis::LeftY as usize], left.y);
            axis(&mut events, map.stick[StickAxis::RightX as usize], right.x);
            axis(&mut events, map.stick[StickAxis::RightY as usize], right.y);
        }
        Report::ProMove { left, right } => pro_sticks(&mut events, map, cal, left, right),
        Report::Accel(accel) => {
            axis(&mut events, map.accel[AccelAxis::X as usize], accel.x);
            axis(&mut events, map.accel[AccelAxis::Y as usize], accel.y);
            axis(&mut events, map.accel[AccelAxis::Z as usize], accel.z);
        }
        Report::Ir(points) => ir_pointer(&mut events, map, cal, points),
        Report::Balance(sensors) => balance(&mut events, map, cal, sensors),
        Report::Watch => return events,
    }
    events.push(sync());
    events
}

/// The Pro Controller reports a wider native range, so its sticks use one
/// fixed multiplier and ignore the table's scale (and sign).
fn pro_sticks(events: &mut Vec<InputEvent>, map: &EventMap, cal: &Calibration, left: &Abs, right: &Abs) {
    let sticks = [
        (StickAxis::LeftX, left.x),
        (StickAxis::LeftY, left.y),
        (StickAxis::RightX, right.x),
        (StickAxis::RightY, right.y),
    ];
    for (slot, raw) in sticks {
        let fixed = AxisMap::new(map.stick[slot as usize].code, cal.pro_stick_scale);
        axis(events, fixed, raw);
    }
}

/// Leftmost tracked point wins; nothing tracked means no axis output.
fn ir_pointer(events: &mut Vec<InputEvent>, map: &EventMap, cal: &Calibration, points: &[Abs; 4]) {
    let best = points
        .iter()
        .filter(|p| p.x != IR_MISSING && p.x > 1)
        .min_by_key(|p| p.x);
    let Some(point) = best else {
        return;
    };

    let x_map = map.ir[IrAxis::X as usize];
    let y_map = map.ir[IrAxis::Y as usize];
    let x = -((point.x as f32 - cal.ir_center_x) * x_map.scale as f32);
    let y = (point.y as f32 - cal.ir_center_y) * y_map.scale as f32;
    events.push(InputEvent::new(EventType::ABSOLUTE, x_map.code.raw(), x as i32));
    events.push(InputEvent::new(EventType::ABSOLUTE, y_map.code.raw(), y as i32));
}

/// Center of gravity from the four sensors (front-right, back-right,
/// front-left, back-left).
fn balance(events: &mut Vec<InputEvent>, map: &EventMap, cal: &Calibration, sensors: &[i32; 4]) {
    let [front_right, back_right, front_left, back_left] = *sensors;
    let total = front_right + back_right + front_left + back_left;
    let left = front_left + back_left;
    let right = total - left;
    let front = front_right + front_left;
    let back = total - front;

    let (x, y) = if total < cal.balance_deadzone {
        (0.0, 0.0)
    } else {
        let norm = (total + 1) as f32 * cal.balance_weight;
        ((right - left) as f32 / norm, (back - front) as f32 / norm)
    };

    let x_map = map.balance[BalanceAxis::X as usize];
    let y_map = map.balance[BalanceAxis::Y as usize];
    events.push(InputEvent::new(
        EventType::ABSOLUTE,
        x_map.code.raw(),
        (x * x_map.scale as f32) as i32,
    ));
    events.push(InputEvent::new(
        EventType::ABSOLUTE,
        y_map.code.raw(),
        (y * y_map.scale as f32) as i32,
    ));
}
